use super::task::RequestId;
use crate::error::Result;
use crate::transform::{MultiSpectrum, Spectrum};
use serde::ser::{Serialize, Serializer};

/// Reply payload for a tag no operation matches.
pub const NOT_DEFINED: &str = "function not defined";

/// Outcome of dispatching one request.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Spectrum(Spectrum),
    MultiSpectrum(MultiSpectrum),
    NotDefined,
}

impl Reply {
    pub fn is_not_defined(&self) -> bool {
        matches!(self, Reply::NotDefined)
    }

    pub fn as_spectrum(&self) -> Option<&Spectrum> {
        match self {
            Reply::Spectrum(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_multi_spectrum(&self) -> Option<&MultiSpectrum> {
        match self {
            Reply::MultiSpectrum(s) => Some(s),
            _ => None,
        }
    }
}

impl From<Spectrum> for Reply {
    fn from(spectrum: Spectrum) -> Self {
        Reply::Spectrum(spectrum)
    }
}

impl From<MultiSpectrum> for Reply {
    fn from(spectrum: MultiSpectrum) -> Self {
        Reply::MultiSpectrum(spectrum)
    }
}

// The reply is the whole payload: a spectrum pair or the bare sentinel string.
impl Serialize for Reply {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Reply::Spectrum(s) => s.serialize(serializer),
            Reply::MultiSpectrum(s) => s.serialize(serializer),
            Reply::NotDefined => serializer.serialize_str(NOT_DEFINED),
        }
    }
}

/// A reply paired with the id of the request that produced it.
#[derive(Debug)]
pub struct Response {
    pub id: RequestId,
    pub reply: Result<Reply>,
}

impl Response {
    pub fn new(id: RequestId, reply: Result<Reply>) -> Self {
        Self { id, reply }
    }

    pub fn into_reply(self) -> Result<Reply> {
        self.reply
    }
}
