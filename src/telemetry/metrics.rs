//! Metrics collection for dispatch workers.

use crate::message::Operation;
use hdrhistogram::Histogram;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

// one hour in nanoseconds
const MAX_TRACKED_NS: u64 = 3_600_000_000_000;

/// Worker metrics collector
#[derive(Debug)]
pub struct Metrics {
    // Indexed by `Operation as usize`
    requests: [AtomicU64; 3],
    undefined: AtomicU64,
    failed: AtomicU64,
    panicked: AtomicU64,

    latency_histogram: RwLock<Histogram<u64>>,
    queue_histogram: RwLock<Histogram<u64>>,

    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            requests: Default::default(),
            undefined: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            panicked: AtomicU64::new(0),
            latency_histogram: RwLock::new(new_histogram()),
            queue_histogram: RwLock::new(new_histogram()),
            start_time: Instant::now(),
        }
    }

    /// Record one dispatched request. `None` is an unknown tag.
    pub fn record_request(&self, op: Option<Operation>, duration_ns: u64) {
        match op {
            Some(op) => self.requests[op as usize].fetch_add(1, Ordering::Relaxed),
            None => self.undefined.fetch_add(1, Ordering::Relaxed),
        };

        if let Some(mut hist) = self.latency_histogram.try_write() {
            let _ = hist.record(duration_ns.min(MAX_TRACKED_NS));
        }
    }

    /// Record time a request spent in the inbox before the worker took it.
    pub fn record_queue_wait(&self, wait_ns: u64) {
        if let Some(mut hist) = self.queue_histogram.try_write() {
            let _ = hist.record(wait_ns.min(MAX_TRACKED_NS));
        }
    }

    pub fn record_failure(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_panic(&self) {
        self.panicked.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of current metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        let latency = self.latency_histogram.read();
        let queue = self.queue_histogram.read();

        MetricsSnapshot {
            uptime: self.start_time.elapsed(),
            requests: [
                self.requests[0].load(Ordering::Relaxed),
                self.requests[1].load(Ordering::Relaxed),
                self.requests[2].load(Ordering::Relaxed),
            ],
            undefined: self.undefined.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            panicked: self.panicked.load(Ordering::Relaxed),
            avg_latency_ns: if latency.len() > 0 { latency.mean() as u64 } else { 0 },
            p50_latency_ns: latency.value_at_quantile(0.50),
            p99_latency_ns: latency.value_at_quantile(0.99),
            max_latency_ns: latency.max(),
            p99_queue_wait_ns: queue.value_at_quantile(0.99),
        }
    }

    pub fn reset(&self) {
        for counter in &self.requests {
            counter.store(0, Ordering::Relaxed);
        }
        self.undefined.store(0, Ordering::Relaxed);
        self.failed.store(0, Ordering::Relaxed);
        self.panicked.store(0, Ordering::Relaxed);

        self.latency_histogram.write().reset();
        self.queue_histogram.write().reset();
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

fn new_histogram() -> Histogram<u64> {
    // 3 significant figures up to one hour
    Histogram::new_with_max(MAX_TRACKED_NS, 3).expect("Failed to create histogram")
}

/// Snapshot of metrics at a point in time
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub uptime: Duration,
    pub requests: [u64; 3],
    pub undefined: u64,
    pub failed: u64,
    pub panicked: u64,
    pub avg_latency_ns: u64,
    pub p50_latency_ns: u64,
    pub p99_latency_ns: u64,
    pub max_latency_ns: u64,
    pub p99_queue_wait_ns: u64,
}

impl MetricsSnapshot {
    pub fn requests_for(&self, op: Operation) -> u64 {
        self.requests[op as usize]
    }

    /// All handled requests, including unknown tags.
    pub fn total(&self) -> u64 {
        self.requests.iter().sum::<u64>() + self.undefined
    }

    pub fn requests_per_second(&self) -> f64 {
        let seconds = self.uptime.as_secs_f64();
        if seconds == 0.0 {
            return 0.0;
        }
        self.total() as f64 / seconds
    }
}
