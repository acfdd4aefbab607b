//! Envelope carried through the worker inbox.

use crate::message::{RequestId, Response, Task};
use std::time::Instant;

/// Where the worker sends the response for one envelope.
pub(crate) enum ReplyRoute {
    /// The worker's shared response channel.
    Outbox,
    /// A private channel owned by a blocking caller.
    Direct(crossbeam_channel::Sender<Response>),
    #[cfg(feature = "async")]
    Async(async_channel::Sender<Response>),
}

pub(crate) struct Envelope {
    pub(crate) id: RequestId,
    pub(crate) task: Task,
    pub(crate) route: ReplyRoute,
    pub(crate) enqueued_at: Instant,
}

impl Envelope {
    pub fn new(task: Task, route: ReplyRoute) -> Self {
        Envelope {
            id: RequestId::next(),
            task,
            route,
            enqueued_at: Instant::now(),
        }
    }
}

impl std::fmt::Debug for Envelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Envelope")
            .field("id", &self.id)
            .field("tag", &self.task.tag)
            .field("enqueued_at", &self.enqueued_at)
            .finish()
    }
}
