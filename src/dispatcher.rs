//! Tag-to-routine dispatch.

use crate::error::Result;
use crate::message::{Reply, Request, Task};
use crate::transform::TransformLibrary;

/// Routes requests to an injected [`TransformLibrary`].
///
/// Holds no state besides the library, so handling the same request twice
/// against a deterministic library yields the same reply.
#[derive(Debug)]
pub struct Dispatcher<L> {
    library: L,
}

impl<L: TransformLibrary> Dispatcher<L> {
    pub fn new(library: L) -> Self {
        Self { library }
    }

    pub fn library(&self) -> &L {
        &self.library
    }

    pub fn into_library(self) -> L {
        self.library
    }

    /// Invoke the routine selected by `request`. Library errors are returned
    /// as-is.
    pub fn handle(&self, request: &Request) -> Result<Reply> {
        match request {
            Request::Dft { series, seconds } => {
                log::debug!("dft: {} samples over {}s on {}", series.len(), seconds, self.library.name());
                self.library.dft(series, *seconds).map(Reply::from)
            }
            Request::MultiDft { rows, seconds } => {
                log::debug!("multidft: {} channels over {}s on {}", rows.len(), seconds, self.library.name());
                self.library.multi_dft(rows, *seconds).map(Reply::from)
            }
            Request::MultiBandpassDft {
                rows,
                seconds,
                low_freq,
                high_freq,
            } => {
                log::debug!(
                    "multibandpassdft: {} channels over {}s, {}-{} Hz on {}",
                    rows.len(),
                    seconds,
                    low_freq,
                    high_freq,
                    self.library.name()
                );
                self.library
                    .multi_dft_bandpass(rows, *seconds, *low_freq, *high_freq)
                    .map(Reply::from)
            }
            Request::Undefined(tag) => {
                log::debug!("no routine for tag {:?}", tag);
                Ok(Reply::NotDefined)
            }
        }
    }

    /// Decode a wire task and dispatch it.
    pub fn handle_task(&self, task: Task) -> Result<Reply> {
        let request = Request::from_task(task)?;
        self.handle(&request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::transform::{MultiSpectrum, Spectrum};
    use parking_lot::Mutex;
    use serde_json::{json, Value};

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Dft(Vec<f32>, f32),
        Multi(Vec<Vec<f32>>, f32),
        Band(Vec<Vec<f32>>, f32, f32, f32),
    }

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<Call>>,
    }

    impl TransformLibrary for Recorder {
        fn name(&self) -> &'static str {
            "recorder"
        }

        fn dft(&self, series: &[f32], seconds: f32) -> Result<Spectrum> {
            self.calls.lock().push(Call::Dft(series.to_vec(), seconds));
            Ok(Spectrum::new(vec![], vec![4.0, 0.0, 0.0, 0.0]))
        }

        fn multi_dft(&self, rows: &[Vec<f32>], seconds: f32) -> Result<MultiSpectrum> {
            self.calls.lock().push(Call::Multi(rows.to_vec(), seconds));
            Ok(MultiSpectrum::default())
        }

        fn multi_dft_bandpass(&self, rows: &[Vec<f32>], seconds: f32, lo: f32, hi: f32) -> Result<MultiSpectrum> {
            self.calls.lock().push(Call::Band(rows.to_vec(), seconds, lo, hi));
            Err(Error::invalid_input("stub refuses"))
        }
    }

    #[test]
    fn test_dft_returns_library_value() {
        let dispatcher = Dispatcher::new(Recorder::default());
        let reply = dispatcher
            .handle_task(Task::new("dft", vec![json!([1, 0, -1, 0]), json!(1)]))
            .unwrap();

        assert_eq!(reply.as_spectrum().unwrap().magnitudes, vec![4.0, 0.0, 0.0, 0.0]);
        assert_eq!(
            *dispatcher.library().calls.lock(),
            vec![Call::Dft(vec![1.0, 0.0, -1.0, 0.0], 1.0)]
        );
    }

    #[test]
    fn test_multidft_forwards_in_order() {
        let dispatcher = Dispatcher::new(Recorder::default());
        dispatcher
            .handle(&Request::MultiDft {
                rows: vec![vec![1.0, 2.0], vec![3.0, 4.0]],
                seconds: 0.5,
            })
            .unwrap();

        assert_eq!(
            *dispatcher.library().calls.lock(),
            vec![Call::Multi(vec![vec![1.0, 2.0], vec![3.0, 4.0]], 0.5)]
        );
    }

    #[test]
    fn test_library_error_propagates_unchanged() {
        let dispatcher = Dispatcher::new(Recorder::default());
        let err = dispatcher
            .handle(&Request::MultiBandpassDft {
                rows: vec![vec![1.0]],
                seconds: 1.0,
                low_freq: 2.0,
                high_freq: 3.0,
            })
            .unwrap_err();

        assert!(matches!(err, Error::InvalidInput(ref m) if m == "stub refuses"));
        assert_eq!(
            *dispatcher.library().calls.lock(),
            vec![Call::Band(vec![vec![1.0]], 1.0, 2.0, 3.0)]
        );
    }

    #[test]
    fn test_undefined_tag_skips_library() {
        let dispatcher = Dispatcher::new(Recorder::default());
        for tag in [Some(""), Some("multiDft"), Some("bogus"), None] {
            let task = Task {
                tag: tag.map(String::from),
                input: Value::Null,
            };
            assert_eq!(dispatcher.handle_task(task).unwrap(), Reply::NotDefined);
        }
        assert!(dispatcher.library().calls.lock().is_empty());
    }
}
