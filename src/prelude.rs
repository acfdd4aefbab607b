pub use crate::config::{Backend, WorkerConfig, WorkerConfigBuilder};
pub use crate::dispatcher::Dispatcher;
pub use crate::error::{Error, Result};
pub use crate::executor::{DispatchWorker, PanicStrategy};
pub use crate::message::{Operation, Reply, Request, RequestId, Response, Task};
pub use crate::transform::{CpuTransform, MultiSpectrum, Spectrum, TransformLibrary};

#[cfg(feature = "telemetry")]
pub use crate::telemetry::MetricsSnapshot;

#[cfg(feature = "async")]
pub use crate::async_bridge::{block_on, PendingReply};

#[cfg(feature = "gpu")]
pub use crate::gpu::GpuTransform;
