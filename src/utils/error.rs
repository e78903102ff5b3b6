//! Error types for the entire crate.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use thiserror::Error;

/// Errors that can occur while capturing or building a stack trace
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TraceError {
    #[error("Stack rewind of {requested} frames out of range (depth {depth})")]
    StackRewindOutOfRange { requested: usize, depth: usize },

    #[error("Malformed frame data at index {index}: {reason}")]
    MalformedFrameData { index: usize, reason: String },

    #[error("Stack traces cannot be changed after instantiation")]
    ImmutableCollection,
}

impl TraceError {
    /// Shorthand for a malformed entry
    pub(crate) fn malformed(index: usize, reason: impl Into<String>) -> Self {
        TraceError::MalformedFrameData {
            index,
            reason: reason.into(),
        }
    }
}

/// Errors that can occur while loading settings
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Errors that can occur while reading input dumps or writing reports
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to read file: {0}")]
    ReadFailed(#[from] std::io::Error),

    #[error("Failed to (de)serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
