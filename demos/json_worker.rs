//! JSON-lines worker: reads tasks from stdin, writes replies to stdout.
//!
//! ```text
//! echo '{"foo":"dft","input":[[1,0,-1,0],1]}' | cargo run --example json_worker
//! ```
//!
//! Set `SPECTRA_BACKEND=gpu` (with the `gpu` feature) to use the GPU library.

use spectra_worker::prelude::*;
use spectra_worker::transport;
use std::io;

fn backend_from_env() -> Backend {
    match std::env::var("SPECTRA_BACKEND").as_deref() {
        #[cfg(feature = "gpu")]
        Ok("gpu") => Backend::Gpu,
        Ok(other) if other != "cpu" => {
            log::warn!("unknown backend {:?}, using cpu", other);
            Backend::Cpu
        }
        _ => Backend::Cpu,
    }
}

fn main() -> spectra_worker::Result<()> {
    env_logger::init();

    let config = WorkerConfig::builder()
        .backend(backend_from_env())
        .thread_name("json-worker")
        .build()?;

    let mut worker = DispatchWorker::from_config(&config)?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    let served = transport::serve(&worker, stdin.lock(), stdout.lock())?;

    #[cfg(feature = "telemetry")]
    if let Some(snapshot) = worker.metrics() {
        log::info!(
            "served {} lines: dft={} multidft={} bandpass={} undefined={} failed={} p99={}us",
            served,
            snapshot.requests_for(Operation::Dft),
            snapshot.requests_for(Operation::MultiDft),
            snapshot.requests_for(Operation::MultiBandpassDft),
            snapshot.undefined,
            snapshot.failed,
            snapshot.p99_latency_ns / 1_000,
        );
    }

    #[cfg(not(feature = "telemetry"))]
    log::info!("served {} lines", served);

    worker.shutdown();
    Ok(())
}
