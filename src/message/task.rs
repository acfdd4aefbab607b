use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global request ID counter
static REQUEST_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Correlates a response with the request that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestId(u64);

impl RequestId {
    pub(crate) fn next() -> Self {
        RequestId(REQUEST_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Task message as it arrives on the wire.
///
/// The tag travels in the `foo` field; `tag` is accepted too. A missing,
/// null or non-string tag is kept as `None` and dispatches to the sentinel
/// reply. `input` is kept as raw JSON; only a known tag requires it to be an
/// array of positional arguments.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Task {
    #[serde(rename = "foo", alias = "tag", default, deserialize_with = "string_or_none")]
    pub tag: Option<String>,

    #[serde(default)]
    pub input: Value,
}

impl Task {
    pub fn new<S: Into<String>>(tag: S, input: Vec<Value>) -> Self {
        Self {
            tag: Some(tag.into()),
            input: Value::Array(input),
        }
    }

    pub fn untagged(input: Vec<Value>) -> Self {
        Self {
            tag: None,
            input: Value::Array(input),
        }
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Positional arguments, if `input` is an array.
    pub fn args(&self) -> Option<&[Value]> {
        self.input.as_array().map(Vec::as_slice)
    }
}

fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(tag) => Some(tag),
        _ => None,
    })
}
