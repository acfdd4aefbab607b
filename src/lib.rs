//! spectra-worker - background dispatch of spectral transforms
//!
//! A worker thread receives tagged task messages, routes each one to a
//! single-channel DFT, a multi-channel DFT, or a multi-channel band-pass DFT
//! on an injected transform library, and sends the result back. Unknown tags
//! get the reply `"function not defined"`.
//!
//! # Quick Start
//!
//! ```no_run
//! use spectra_worker::prelude::*;
//! use serde_json::json;
//!
//! let worker = DispatchWorker::spawn(CpuTransform::new(), &WorkerConfig::default()).unwrap();
//!
//! let reply = worker
//!     .call(Task::new("dft", vec![json!([1.0, 0.0, -1.0, 0.0]), json!(1.0)]))
//!     .unwrap();
//!
//! println!("{}", serde_json::to_string(&reply).unwrap());
//! ```
//!
//! # Features
//!
//! - **telemetry** (default): per-operation counters and latency histograms
//! - **gpu**: wgpu compute backend ([`gpu::GpuTransform`])
//! - **async**: [`DispatchWorker::call_async`] returning an awaitable handle

#![warn(missing_debug_implementations)]

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod executor;
pub mod message;
pub mod prelude;
pub mod telemetry;
pub mod transform;
pub mod transport;

#[cfg(feature = "async")]
pub mod async_bridge;

#[cfg(feature = "gpu")]
pub mod gpu;

// Re-export key types at crate root
pub use config::{build_library, Backend, WorkerConfig, WorkerConfigBuilder};
pub use dispatcher::Dispatcher;
pub use error::{Error, Result};
pub use executor::DispatchWorker;
pub use message::{Operation, Reply, Request, RequestId, Response, Task, NOT_DEFINED};
pub use transform::{CpuTransform, MultiSpectrum, Spectrum, TransformLibrary};
