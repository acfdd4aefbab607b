//! wgpu-backed transform library.

pub mod backend;
pub mod buffer;
pub mod kernel;
pub mod runtime;

pub use backend::GpuTransform;
pub use buffer::GpuBuffer;
pub use kernel::{CompiledKernel, DftParams};
pub use runtime::GpuRuntime;
