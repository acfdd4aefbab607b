use rand::Rng;
use serde_json::json;
use spectra_worker::prelude::*;
use std::f32::consts::TAU;
use std::sync::Arc;

fn noisy_sine(freq: f32, n: usize, seconds: f32) -> Vec<f32> {
    let mut rng = rand::thread_rng();
    let rate = n as f32 / seconds;
    (0..n)
        .map(|i| (TAU * freq * i as f32 / rate).sin() + rng.gen_range(-0.05..0.05))
        .collect()
}

#[test]
fn stress_many_posted_requests() {
    let worker = DispatchWorker::spawn(CpuTransform::new(), &WorkerConfig::default()).unwrap();

    let mut ids = Vec::new();
    for i in 0..500 {
        let task = match i % 3 {
            0 => Task::new("dft", vec![json!(noisy_sine(8.0, 128, 1.0)), json!(1.0)]),
            1 => Task::new("multidft", vec![json!([noisy_sine(4.0, 64, 1.0), noisy_sine(9.0, 64, 1.0)]), json!(1.0)]),
            _ => Task::new("unknown", vec![]),
        };
        ids.push(worker.post(task).unwrap());
    }

    for (i, id) in ids.into_iter().enumerate() {
        let response = worker.responses().recv().unwrap();
        assert_eq!(response.id, id);

        let reply = response.reply.unwrap();
        match i % 3 {
            0 => assert_eq!(reply.as_spectrum().unwrap().peak_frequency(), Some(8.0)),
            1 => {
                let multi = reply.as_multi_spectrum().unwrap();
                assert_eq!(multi.channel(1).unwrap().peak_frequency(), Some(9.0));
            }
            _ => assert!(reply.is_not_defined()),
        }
    }
}

#[test]
fn stress_parallel_callers() {
    let worker = Arc::new(DispatchWorker::spawn(CpuTransform::new(), &WorkerConfig::default()).unwrap());

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let worker = Arc::clone(&worker);
            std::thread::spawn(move || {
                let freq = 2.0 + t as f32;
                for _ in 0..50 {
                    let rows = vec![noisy_sine(freq, 256, 2.0)];
                    let reply = worker
                        .call(Task::new("multibandpassdft", vec![json!(rows), json!(2.0), json!(1.0), json!(16.0)]))
                        .unwrap();
                    let peak = reply.as_multi_spectrum().unwrap().channel(0).unwrap().peak_frequency();
                    assert_eq!(peak, Some(freq));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    #[cfg(feature = "telemetry")]
    {
        let snapshot = worker.metrics().unwrap();
        assert_eq!(snapshot.requests_for(Operation::MultiBandpassDft), 400);
        assert_eq!(snapshot.failed, 0);
    }
}
