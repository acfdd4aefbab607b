//! Non-blocking dispatch through the worker thread.

use crate::error::{Error, Result};
use crate::executor::{DispatchWorker, Envelope, ReplyRoute};
use crate::message::{Reply, RequestId, Response, Task};
use async_channel::{bounded, Receiver};
use futures::Future;

impl DispatchWorker {
    /// Queue a task and get a handle that resolves to its reply.
    ///
    /// The transform still runs on the worker thread; only the wait is async.
    pub fn call_async(&self, task: Task) -> Result<PendingReply> {
        let (sender, receiver) = bounded(1);
        let id = self.send(Envelope::new(task, ReplyRoute::Async(sender)))?;
        Ok(PendingReply { id, receiver })
    }
}

/// Block on a future in the current thread
///
/// This is a convenience wrapper around futures::executor::block_on
pub fn block_on<F>(future: F) -> F::Output
where
    F: Future,
{
    futures::executor::block_on(future)
}

/// Handle for one in-flight request.
#[derive(Debug)]
pub struct PendingReply {
    id: RequestId,
    receiver: Receiver<Response>,
}

impl PendingReply {
    pub fn id(&self) -> RequestId {
        self.id
    }

    /// Wait for the reply.
    pub async fn join(self) -> Result<Reply> {
        self.receiver
            .recv()
            .await
            .map_err(|_| Error::async_error("worker dropped the request"))?
            .into_reply()
    }

    /// Try to get the reply without waiting
    pub fn try_join(&self) -> Option<Result<Reply>> {
        self.receiver.try_recv().ok().map(Response::into_reply)
    }
}
