//! JSON report writer and stack dump reader.

use crate::stack::{ErrorReport, FrameDetails, FrameDigest, RawFrame, SymbolNormalizer, Trace};
use crate::utils::config::SCHEMA_VERSION;
use crate::utils::error::{OutputError, TraceError};
use chrono::Utc;
use log::debug;
use serde::Serialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Frames of a report, reduced or full
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ReportFrames {
    Digest(Vec<FrameDigest>),
    Details(Vec<FrameDetails>),
}

/// Top-level structure of a JSON report
#[derive(Debug, Clone, Serialize)]
pub struct TraceReport {
    /// Schema version for compatibility checking
    pub version: String,

    /// Timestamp when the report was generated
    pub generated_at: String,

    pub frame_count: usize,

    pub frames: ReportFrames,
}

impl TraceReport {
    /// Report with file, line and signature per frame
    pub fn digest(trace: &Trace, normalizer: &SymbolNormalizer<'_>) -> Self {
        Self::with_frames(trace, ReportFrames::Digest(trace.to_json(normalizer)))
    }

    /// Report with every frame field
    pub fn details(trace: &Trace, normalizer: &SymbolNormalizer<'_>) -> Self {
        Self::with_frames(trace, ReportFrames::Details(trace.to_array(normalizer)))
    }

    fn with_frames(trace: &Trace, frames: ReportFrames) -> Self {
        Self {
            version: SCHEMA_VERSION.to_string(),
            generated_at: Utc::now().to_rfc3339(),
            frame_count: trace.len(),
            frames,
        }
    }

    pub fn to_json_string(&self) -> Result<String, OutputError> {
        serde_json::to_string_pretty(self).map_err(OutputError::SerializationFailed)
    }
}

/// A stack dump read from disk
#[derive(Debug, Clone)]
pub enum StackDump {
    /// Bare array of raw entries
    Frames(Vec<RawFrame>),
    /// A thrown error with its captured stack
    Error(ErrorReport),
}

impl StackDump {
    /// Classify and validate parsed JSON
    pub fn from_value(value: &serde_json::Value) -> Result<Self, TraceError> {
        if value.is_array() {
            RawFrame::from_json_array(value).map(StackDump::Frames)
        } else {
            ErrorReport::from_value(value).map(StackDump::Error)
        }
    }
}

/// Read a stack dump from a JSON file
///
/// # Errors
/// * `OutputError::ReadFailed` - File read error
/// * `OutputError::SerializationFailed` - Not JSON
/// * `OutputError::InvalidInput` - JSON of the wrong shape
pub fn read_dump(input_path: impl AsRef<Path>) -> Result<StackDump, OutputError> {
    let input_path = input_path.as_ref();

    debug!("Reading stack dump from: {}", input_path.display());

    let file = File::open(input_path).map_err(OutputError::ReadFailed)?;
    let value: serde_json::Value =
        serde_json::from_reader(BufReader::new(file)).map_err(OutputError::SerializationFailed)?;

    StackDump::from_value(&value).map_err(|e| OutputError::InvalidInput(e.to_string()))
}
