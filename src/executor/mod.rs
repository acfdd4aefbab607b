//! Worker thread infrastructure.
//!
//! A [`DispatchWorker`] owns one OS thread and one [`crate::Dispatcher`].
//! Requests are handled one at a time, in arrival order.

pub mod panic_handler;
pub mod task;
pub mod worker;

pub use panic_handler::{PanicHandler, PanicInfo, PanicStrategy};
pub use worker::DispatchWorker;

pub(crate) use task::{Envelope, ReplyRoute};
