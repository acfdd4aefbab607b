use super::task::Task;
use crate::error::{Error, Result};
use serde_json::Value;

/// The operations a worker knows how to dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Dft,
    MultiDft,
    MultiBandpassDft,
}

impl Operation {
    pub const ALL: [Operation; 3] = [
        Operation::Dft,
        Operation::MultiDft,
        Operation::MultiBandpassDft,
    ];

    /// Wire tag for this operation.
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Dft => "dft",
            Operation::MultiDft => "multidft",
            Operation::MultiBandpassDft => "multibandpassdft",
        }
    }

    /// Exact, case-sensitive tag match.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "dft" => Some(Operation::Dft),
            "multidft" => Some(Operation::MultiDft),
            "multibandpassdft" => Some(Operation::MultiBandpassDft),
            _ => None,
        }
    }

    fn arity(self) -> usize {
        match self {
            Operation::Dft | Operation::MultiDft => 2,
            Operation::MultiBandpassDft => 4,
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed request, one variant per operation plus the unknown-tag case.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Dft {
        series: Vec<f32>,
        seconds: f32,
    },
    MultiDft {
        rows: Vec<Vec<f32>>,
        seconds: f32,
    },
    MultiBandpassDft {
        rows: Vec<Vec<f32>>,
        seconds: f32,
        low_freq: f32,
        high_freq: f32,
    },
    /// Tag matched no operation. The input is never inspected.
    Undefined(Option<String>),
}

impl Request {
    /// Decode the positional `input` of a task.
    ///
    /// Only the types of the arguments are checked, plus that every number
    /// survives the conversion to `f32` (no overflow to infinity, no nonzero
    /// value flushed to zero). Shape rules (equal row lengths, positive
    /// duration, band order) belong to the transform library. Extra trailing
    /// arguments are ignored.
    pub fn from_task(task: Task) -> Result<Self> {
        let op = match task.tag.as_deref().and_then(Operation::from_tag) {
            Some(op) => op,
            None => return Ok(Request::Undefined(task.tag)),
        };

        let input = task.args().ok_or_else(|| {
            Error::malformed(op.as_str(), format!("input must be an array, got {}", task.input))
        })?;
        if input.len() < op.arity() {
            return Err(Error::malformed(
                op.as_str(),
                format!("expected {} arguments, got {}", op.arity(), input.len()),
            ));
        }

        let request = match op {
            Operation::Dft => Request::Dft {
                series: series(op, "series", &input[0])?,
                seconds: number(op, "duration", &input[1])?,
            },
            Operation::MultiDft => Request::MultiDft {
                rows: rows(op, &input[0])?,
                seconds: number(op, "duration", &input[1])?,
            },
            Operation::MultiBandpassDft => Request::MultiBandpassDft {
                rows: rows(op, &input[0])?,
                seconds: number(op, "duration", &input[1])?,
                low_freq: number(op, "low frequency", &input[2])?,
                high_freq: number(op, "high frequency", &input[3])?,
            },
        };

        Ok(request)
    }

    pub fn op(&self) -> Option<Operation> {
        match self {
            Request::Dft { .. } => Some(Operation::Dft),
            Request::MultiDft { .. } => Some(Operation::MultiDft),
            Request::MultiBandpassDft { .. } => Some(Operation::MultiBandpassDft),
            Request::Undefined(_) => None,
        }
    }
}

fn number(op: Operation, what: &str, value: &Value) -> Result<f32> {
    let wide = value
        .as_f64()
        .ok_or_else(|| Error::malformed(op.as_str(), format!("{} must be a number, got {}", what, value)))?;
    narrow(op, what, wide)
}

// f64 -> f32 without silently turning a value into inf or 0
fn narrow(op: Operation, what: &str, wide: f64) -> Result<f32> {
    let narrow = wide as f32;
    if wide.is_finite() && !narrow.is_finite() {
        return Err(Error::malformed(
            op.as_str(),
            format!("{} = {:e} is out of range for f32", what, wide),
        ));
    }
    if wide != 0.0 && narrow == 0.0 {
        return Err(Error::malformed(
            op.as_str(),
            format!("{} = {:e} underflows to zero as f32", what, wide),
        ));
    }
    Ok(narrow)
}

fn series(op: Operation, what: &str, value: &Value) -> Result<Vec<f32>> {
    let items = value
        .as_array()
        .ok_or_else(|| Error::malformed(op.as_str(), format!("{} must be an array", what)))?;

    items
        .iter()
        .enumerate()
        .map(|(i, v)| number(op, &format!("{}[{}]", what, i), v))
        .collect()
}

fn rows(op: Operation, value: &Value) -> Result<Vec<Vec<f32>>> {
    let items = value
        .as_array()
        .ok_or_else(|| Error::malformed(op.as_str(), "rows must be an array of arrays"))?;

    items
        .iter()
        .enumerate()
        .map(|(i, row)| series(op, &format!("row {}", i), row))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn task(value: Value) -> Task {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_operation_tags_round_trip() {
        for op in Operation::ALL {
            assert_eq!(Operation::from_tag(op.as_str()), Some(op));
        }
    }

    #[test]
    fn test_near_miss_tags_are_undefined() {
        for tag in ["", "multiDft", "DFT", " dft", "multibandpass", "bogus"] {
            assert_eq!(Operation::from_tag(tag), None, "tag {:?}", tag);
        }
    }

    #[test]
    fn test_decode_dft() {
        let request = Request::from_task(task(json!({ "foo": "dft", "input": [[1, 0, -1, 0], 1] }))).unwrap();
        assert_eq!(
            request,
            Request::Dft {
                series: vec![1.0, 0.0, -1.0, 0.0],
                seconds: 1.0
            }
        );
        assert_eq!(request.op(), Some(Operation::Dft));
    }

    #[test]
    fn test_decode_bandpass_keeps_order() {
        let request = Request::from_task(task(json!({
            "foo": "multibandpassdft",
            "input": [[[1, 2], [3, 4]], 2.5, 8, 12]
        })))
        .unwrap();

        assert_eq!(
            request,
            Request::MultiBandpassDft {
                rows: vec![vec![1.0, 2.0], vec![3.0, 4.0]],
                seconds: 2.5,
                low_freq: 8.0,
                high_freq: 12.0,
            }
        );
    }

    #[test]
    fn test_unknown_tag_ignores_input() {
        let request = Request::from_task(Task::new("bogus", vec![json!({"weird": true})])).unwrap();
        assert_eq!(request, Request::Undefined(Some("bogus".to_string())));

        let request = Request::from_task(Task::untagged(vec![])).unwrap();
        assert_eq!(request, Request::Undefined(None));
    }

    #[test]
    fn test_missing_arguments() {
        let err = Request::from_task(Task::new("multidft", vec![json!([[1.0]])])).unwrap_err();
        assert!(matches!(err, Error::MalformedInput { op: "multidft", .. }));
    }

    #[test]
    fn test_non_numeric_sample() {
        let err = Request::from_task(Task::new("dft", vec![json!([1, "x"]), json!(1)])).unwrap_err();
        assert!(err.to_string().contains("series[1]"));
    }

    #[test]
    fn test_known_tag_needs_array_input() {
        let err = Request::from_task(task(json!({ "foo": "dft", "input": 5 }))).unwrap_err();
        assert!(matches!(err, Error::MalformedInput { op: "dft", .. }));

        let err = Request::from_task(task(json!({ "foo": "multidft" }))).unwrap_err();
        assert!(err.to_string().contains("input must be an array"));
    }

    #[test]
    fn test_unknown_tag_with_odd_input_shapes() {
        for input in [json!(5), json!(null), json!({ "a": 1 })] {
            let request = Request::from_task(task(json!({ "foo": "bogus", "input": input }))).unwrap();
            assert_eq!(request, Request::Undefined(Some("bogus".to_string())));
        }

        let request = Request::from_task(task(json!({ "foo": 7, "input": [] }))).unwrap();
        assert_eq!(request, Request::Undefined(None));
    }

    #[test]
    fn test_out_of_range_numbers_rejected() {
        let err = Request::from_task(task(json!({ "foo": "dft", "input": [[1e300], 1] }))).unwrap_err();
        assert!(matches!(err, Error::MalformedInput { op: "dft", .. }));
        assert!(err.to_string().contains("series[0]"));

        let err = Request::from_task(task(json!({
            "foo": "multibandpassdft",
            "input": [[[1]], 1, 1, 1e40]
        })))
        .unwrap_err();
        assert!(err.to_string().contains("high frequency"));
    }

    #[test]
    fn test_underflowing_numbers_rejected() {
        let err = Request::from_task(task(json!({ "foo": "dft", "input": [[1], 1e-60] }))).unwrap_err();
        assert!(matches!(err, Error::MalformedInput { op: "dft", .. }));
        assert!(err.to_string().contains("duration"));

        let err = Request::from_task(task(json!({
            "foo": "multibandpassdft",
            "input": [[[1]], 1, 1e-50, 2]
        })))
        .unwrap_err();
        assert!(err.to_string().contains("low frequency"));
    }

    #[test]
    fn test_small_but_representable_numbers_pass() {
        let request = Request::from_task(task(json!({ "foo": "dft", "input": [[0, -0.0, 1e-40], 1e-30] }))).unwrap();
        match request {
            Request::Dft { series, seconds } => {
                assert_eq!(series[0], 0.0);
                assert!(series[2] > 0.0);
                assert!(seconds > 0.0);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_extra_arguments_ignored() {
        let request = Request::from_task(Task::new("dft", vec![json!([1.0]), json!(1.0), json!("extra")])).unwrap();
        assert_eq!(request.op(), Some(Operation::Dft));
    }
}
