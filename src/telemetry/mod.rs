//! Telemetry for dispatch workers.
//!
//! Per-operation request counts, failures, panics and latency histograms.

#[cfg(feature = "telemetry")]
pub mod metrics;

#[cfg(feature = "telemetry")]
pub use metrics::{Metrics, MetricsSnapshot};

// Stub implementations when telemetry is disabled
#[cfg(not(feature = "telemetry"))]
pub mod metrics {
    use crate::message::Operation;

    #[derive(Debug, Clone, Default)]
    pub struct Metrics;

    impl Metrics {
        pub fn new() -> Self { Self }
        pub fn record_request(&self, _: Option<Operation>, _: u64) {}
        pub fn record_queue_wait(&self, _: u64) {}
        pub fn record_failure(&self) {}
        pub fn record_panic(&self) {}
        pub fn snapshot(&self) -> MetricsSnapshot { MetricsSnapshot::default() }
    }

    #[derive(Debug, Clone, Default)]
    pub struct MetricsSnapshot {
        pub requests: [u64; 3],
        pub undefined: u64,
        pub failed: u64,
        pub panicked: u64,
    }

    impl MetricsSnapshot {
        pub fn requests_for(&self, op: Operation) -> u64 {
            self.requests[op as usize]
        }
    }
}

#[cfg(not(feature = "telemetry"))]
pub use metrics::{Metrics, MetricsSnapshot};
