//! Async access to a [`crate::DispatchWorker`].

pub mod spawn;

pub use spawn::{block_on, PendingReply};
