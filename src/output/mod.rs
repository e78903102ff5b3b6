//! Output generation and input loading.
//!
//! This module handles:
//! - Reading stack dumps (raw frame arrays or error reports) from disk
//! - Building versioned JSON reports for rendered traces

pub mod report;

// Re-export main functions
pub use report::{read_dump, ReportFrames, StackDump, TraceReport};
