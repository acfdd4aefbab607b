use crate::error::{Error, Result};
use crate::executor::PanicStrategy;
use crate::transform::{CpuTransform, TransformLibrary};

const MIN_STACK_SIZE: usize = 64 * 1024;

/// Which bundled transform library backs a worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    #[default]
    Cpu,

    #[cfg(feature = "gpu")]
    Gpu,
}

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub backend: Backend,
    pub thread_name: String,
    pub stack_size: Option<usize>,
    /// `None` means an unbounded inbox.
    pub inbox_capacity: Option<usize>,
    pub panic_strategy: PanicStrategy,

    #[cfg(feature = "telemetry")]
    pub enable_telemetry: bool,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            thread_name: "spectra-worker".to_string(),
            stack_size: Some(2 * 1024 * 1024),
            inbox_capacity: None,
            panic_strategy: PanicStrategy::default(),

            #[cfg(feature = "telemetry")]
            enable_telemetry: true,
        }
    }
}

impl WorkerConfig {
    pub fn builder() -> WorkerConfigBuilder {
        WorkerConfigBuilder::new()
    }

    pub fn validate(&self) -> Result<()> {
        if self.thread_name.trim().is_empty() {
            return Err(Error::config("thread_name must not be empty"));
        }

        if let Some(cap) = self.inbox_capacity {
            if cap == 0 {
                return Err(Error::config("inbox_capacity must be > 0"));
            }
        }

        if let Some(size) = self.stack_size {
            if size < MIN_STACK_SIZE {
                return Err(Error::config(format!(
                    "stack_size must be at least {} bytes",
                    MIN_STACK_SIZE
                )));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct WorkerConfigBuilder {
    config: WorkerConfig,
}

impl WorkerConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: WorkerConfig::default(),
        }
    }

    pub fn backend(mut self, backend: Backend) -> Self {
        self.config.backend = backend;
        self
    }

    pub fn thread_name<S: Into<String>>(mut self, name: S) -> Self {
        self.config.thread_name = name.into();
        self
    }

    pub fn stack_size(mut self, size: usize) -> Self {
        self.config.stack_size = Some(size);
        self
    }

    pub fn inbox_capacity(mut self, capacity: usize) -> Self {
        self.config.inbox_capacity = Some(capacity);
        self
    }

    pub fn panic_strategy(mut self, strategy: PanicStrategy) -> Self {
        self.config.panic_strategy = strategy;
        self
    }

    #[cfg(feature = "telemetry")]
    pub fn enable_telemetry(mut self, enable: bool) -> Self {
        self.config.enable_telemetry = enable;
        self
    }

    pub fn build(self) -> Result<WorkerConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Instantiate the transform library selected by `config.backend`.
pub fn build_library(config: &WorkerConfig) -> Result<Box<dyn TransformLibrary>> {
    match config.backend {
        Backend::Cpu => Ok(Box::new(CpuTransform::new())),

        #[cfg(feature = "gpu")]
        Backend::Gpu => Ok(Box::new(crate::gpu::GpuTransform::new()?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = WorkerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.backend, Backend::Cpu);
        assert_eq!(config.inbox_capacity, None);
    }

    #[test]
    fn test_builder_rejects_zero_capacity() {
        let result = WorkerConfig::builder().inbox_capacity(0).build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_builder_rejects_blank_thread_name() {
        let result = WorkerConfig::builder().thread_name("  ").build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_rejects_tiny_stack() {
        let result = WorkerConfig::builder().stack_size(1024).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_sets_fields() {
        let config = WorkerConfig::builder()
            .thread_name("dft")
            .inbox_capacity(8)
            .panic_strategy(PanicStrategy::Isolate)
            .build()
            .unwrap();

        assert_eq!(config.thread_name, "dft");
        assert_eq!(config.inbox_capacity, Some(8));
        assert_eq!(config.panic_strategy, PanicStrategy::Isolate);
    }

    #[test]
    fn test_build_cpu_library() {
        let library = build_library(&WorkerConfig::default()).unwrap();
        assert_eq!(library.name(), "cpu");
    }
}
