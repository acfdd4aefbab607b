// worker thread: one dispatcher, one inbox, one request at a time
use super::panic_handler::PanicHandler;
use super::{Envelope, ReplyRoute};
use crate::config::{build_library, WorkerConfig};
use crate::dispatcher::Dispatcher;
use crate::error::{Error, Result};
use crate::message::{Reply, Request, RequestId, Response, Task};
use crate::telemetry::{Metrics, MetricsSnapshot};
use crate::transform::TransformLibrary;
use crossbeam_channel::{Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

/// Background thread that dispatches tasks to a transform library.
///
/// Responses to [`post`](Self::post) arrive on [`responses`](Self::responses)
/// in submission order. [`call`](Self::call) blocks for its own response and
/// never shows up on the shared channel.
pub struct DispatchWorker {
    inbox: Option<Sender<Envelope>>,
    responses: Receiver<Response>,
    thread: Option<JoinHandle<()>>,
    name: String,
    metrics: Option<Arc<Metrics>>,
}

impl DispatchWorker {
    /// Start a worker around an already-built library.
    pub fn spawn<L>(library: L, config: &WorkerConfig) -> Result<Self>
    where
        L: TransformLibrary + 'static,
    {
        config.validate()?;

        let (inbox_tx, inbox_rx) = match config.inbox_capacity {
            Some(cap) => crossbeam_channel::bounded(cap),
            None => crossbeam_channel::unbounded(),
        };
        let (outbox_tx, outbox_rx) = crossbeam_channel::unbounded();

        let metrics = telemetry_enabled(config).then(|| Arc::new(Metrics::new()));
        let backend = library.name();

        let state = WorkerState {
            dispatcher: Dispatcher::new(library),
            panic_handler: PanicHandler::new(config.panic_strategy),
            outbox: outbox_tx,
            metrics: metrics.clone(),
        };

        let mut builder = thread::Builder::new().name(config.thread_name.clone());
        if let Some(stack_size) = config.stack_size {
            builder = builder.stack_size(stack_size);
        }

        let thread = builder
            .spawn(move || state.run(inbox_rx))
            .map_err(|e| Error::executor(format!("spawn failed: {}", e)))?;

        log::info!("worker {} started on {} backend", config.thread_name, backend);

        Ok(Self {
            inbox: Some(inbox_tx),
            responses: outbox_rx,
            thread: Some(thread),
            name: config.thread_name.clone(),
            metrics,
        })
    }

    /// Start a worker with the library selected by `config.backend`.
    pub fn from_config(config: &WorkerConfig) -> Result<Self> {
        let library = build_library(config)?;
        Self::spawn(library, config)
    }

    /// Queue a task; its response goes to [`responses`](Self::responses).
    pub fn post(&self, task: Task) -> Result<RequestId> {
        self.send(Envelope::new(task, ReplyRoute::Outbox))
    }

    /// Responses for posted tasks.
    pub fn responses(&self) -> &Receiver<Response> {
        &self.responses
    }

    /// Dispatch a task and wait for its reply.
    pub fn call(&self, task: Task) -> Result<Reply> {
        let (tx, rx) = crossbeam_channel::bounded(1);
        self.send(Envelope::new(task, ReplyRoute::Direct(tx)))?;
        rx.recv().map_err(|_| Error::Disconnected)?.into_reply()
    }

    pub(crate) fn send(&self, envelope: Envelope) -> Result<RequestId> {
        let inbox = self.inbox.as_ref().ok_or(Error::Disconnected)?;
        let id = envelope.id;
        inbox.send(envelope).map_err(|_| Error::Disconnected)?;
        Ok(id)
    }

    /// Tasks waiting in the inbox.
    pub fn pending(&self) -> usize {
        self.inbox.as_ref().map_or(0, |inbox| inbox.len())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `None` when telemetry is disabled.
    pub fn metrics(&self) -> Option<MetricsSnapshot> {
        self.metrics.as_ref().map(|m| m.snapshot())
    }

    pub fn is_running(&self) -> bool {
        self.inbox.is_some()
    }

    /// Stop accepting tasks, drain the inbox, and join the thread.
    pub fn shutdown(&mut self) {
        // dropping the sender ends the worker loop once the inbox is empty
        if self.inbox.take().is_none() {
            return;
        }

        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::warn!("worker {} exited with a panic", self.name);
            }
        }

        log::info!("worker {} stopped", self.name);
    }
}

impl Drop for DispatchWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for DispatchWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchWorker")
            .field("name", &self.name)
            .field("running", &self.is_running())
            .field("pending", &self.pending())
            .finish()
    }
}

#[cfg(feature = "telemetry")]
fn telemetry_enabled(config: &WorkerConfig) -> bool {
    config.enable_telemetry
}

#[cfg(not(feature = "telemetry"))]
fn telemetry_enabled(_config: &WorkerConfig) -> bool {
    false
}

// everything the worker thread owns
struct WorkerState<L> {
    dispatcher: Dispatcher<L>,
    panic_handler: PanicHandler,
    outbox: Sender<Response>,
    metrics: Option<Arc<Metrics>>,
}

impl<L: TransformLibrary> WorkerState<L> {
    // main loop
    fn run(self, inbox: Receiver<Envelope>) {
        for envelope in inbox.iter() {
            let id = envelope.id;
            let route = envelope.route;
            let queued_ns = envelope.enqueued_at.elapsed().as_nanos() as u64;

            let reply = self.process(envelope.task);
            if let Err(ref e) = reply {
                log::warn!("request {} failed: {}", id, e);
            }

            if let Some(ref metrics) = self.metrics {
                metrics.record_queue_wait(queued_ns);
            }

            self.deliver(route, Response::new(id, reply));
        }
    }

    fn process(&self, task: Task) -> Result<Reply> {
        let start = Instant::now();

        let request = match Request::from_task(task) {
            Ok(request) => request,
            Err(e) => {
                if let Some(ref metrics) = self.metrics {
                    metrics.record_failure();
                }
                return Err(e);
            }
        };

        let op = request.op();
        let reply = match self.panic_handler.execute(|| self.dispatcher.handle(&request)) {
            Ok(reply) => reply,
            Err(info) => {
                if let Some(ref metrics) = self.metrics {
                    metrics.record_panic();
                }
                Err(Error::WorkerPanic(info.message))
            }
        };

        if let Some(ref metrics) = self.metrics {
            metrics.record_request(op, start.elapsed().as_nanos() as u64);
            if reply.is_err() {
                metrics.record_failure();
            }
        }

        reply
    }

    fn deliver(&self, route: ReplyRoute, response: Response) {
        // a dropped receiver only means the caller stopped listening
        match route {
            ReplyRoute::Outbox => {
                let _ = self.outbox.send(response);
            }
            ReplyRoute::Direct(tx) => {
                let _ = tx.send(response);
            }
            #[cfg(feature = "async")]
            ReplyRoute::Async(tx) => {
                let _ = tx.try_send(response);
            }
        }
    }
}
