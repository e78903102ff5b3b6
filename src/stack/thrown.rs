//! Thrown errors as seen by the trace builder.

use super::raw::RawFrame;
use super::trace::Trace;
use crate::utils::error::TraceError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// An error raised by a host runtime, with the stack it captured
pub trait ThrownError {
    /// Runtime type of the error
    fn type_name(&self) -> &str;

    fn message(&self) -> &str;

    fn code(&self) -> i64 {
        0
    }

    /// Where the error was constructed
    fn file(&self) -> Option<&str>;

    fn line(&self) -> Option<u32>;

    /// The error this one wraps
    fn cause(&self) -> Option<&dyn ThrownError> {
        None
    }

    /// Raw stack captured when the error was constructed
    fn raw_trace(&self) -> &[RawFrame];

    /// A trace built ahead of time, returned as is instead of rebuilding
    fn prepared_trace(&self) -> Option<Arc<Trace>> {
        None
    }
}

/// Serialized form of a thrown error
///
/// ```json
/// {"class": "RuntimeException", "message": "boom", "code": 3,
///  "file": "/app/src/x.php", "line": 40, "previous": null, "trace": []}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorReport {
    #[serde(rename = "class")]
    pub type_name: String,

    #[serde(default)]
    pub message: String,

    #[serde(default)]
    pub code: i64,

    #[serde(default)]
    pub file: Option<String>,

    #[serde(default)]
    pub line: Option<u32>,

    #[serde(default)]
    pub previous: Option<Box<ErrorReport>>,

    #[serde(default)]
    pub trace: Vec<RawFrame>,
}

impl ErrorReport {
    /// Validate a JSON error dump
    ///
    /// Stack entries are checked one by one so a bad entry is reported
    /// with its index.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, TraceError> {
        if let Some(trace) = value.get("trace") {
            RawFrame::from_json_array(trace)?;
        }

        serde_json::from_value(value.clone())
            .map_err(|e| TraceError::malformed(0, format!("invalid error report: {}", e)))
    }
}

impl ThrownError for ErrorReport {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn message(&self) -> &str {
        &self.message
    }

    fn code(&self) -> i64 {
        self.code
    }

    fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    fn line(&self) -> Option<u32> {
        self.line
    }

    fn cause(&self) -> Option<&dyn ThrownError> {
        self.previous
            .as_deref()
            .map(|previous| previous as &dyn ThrownError)
    }

    fn raw_trace(&self) -> &[RawFrame] {
        &self.trace
    }
}
