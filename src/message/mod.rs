//! Inbound and outbound message types.
//!
//! A [`Task`] is the loose wire form (`{"foo": tag, "input": [...]}`). It is
//! decoded into a typed [`Request`] before dispatch, and every dispatch
//! produces a [`Reply`].

pub mod reply;
pub mod request;
pub mod task;

pub use reply::{Reply, Response, NOT_DEFINED};
pub use request::{Operation, Request};
pub use task::{RequestId, Task};
