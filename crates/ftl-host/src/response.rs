use std::fmt;

use ftl_ledger::LedgerError;
use serde::{Deserialize, Serialize};

/// Outcome class of a [`Response`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
    Error,
}

/// Protocol-level result of one invocation.
///
/// Success carries the raw payload bytes; failure carries a machine-readable
/// code and a human-readable message. Nothing else crosses the boundary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub status: Status,
    #[serde(with = "payload_text")]
    pub payload: Vec<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub message: String,
}

pub(crate) const INTERNAL_FAULT: &str = "InternalFault";

impl Response {
    pub fn success(payload: Vec<u8>) -> Self {
        Self {
            status: Status::Ok,
            payload,
            code: None,
            message: String::new(),
        }
    }

    pub fn failure(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            payload: Vec::new(),
            code: Some(code.into()),
            message: message.into(),
        }
    }

    pub fn from_error(err: &LedgerError) -> Self {
        Self::failure(err.code(), err.to_string())
    }

    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }

    /// Payload as UTF-8 text (payloads are decimal numbers, `true`, or empty).
    pub fn payload_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.payload).ok()
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.status, &self.code) {
            (Status::Ok, _) => write!(f, "ok {}", String::from_utf8_lossy(&self.payload)),
            (Status::Error, Some(code)) => write!(f, "error [{code}] {}", self.message),
            (Status::Error, None) => write!(f, "error {}", self.message),
        }
    }
}

/// Payloads are rendered as text in JSON output.
mod payload_text {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(payload: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&String::from_utf8_lossy(payload))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        String::deserialize(d).map(String::into_bytes)
    }
}
