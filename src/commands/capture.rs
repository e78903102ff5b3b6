//! Capture command implementation.
//!
//! Captures the CLI's own stack; mostly useful to check how native frames
//! and path aliases render on a given machine.

use super::models::CaptureArgs;
use super::render::format_trace;
use super::utils::load_settings;
use crate::stack::TraceBuilder;
use anyhow::{Context, Result};
use log::info;
use std::time::Instant;

/// Execute the capture command
///
/// **Public** - main entry point called from main.rs
pub fn execute_capture(args: CaptureArgs) -> Result<String> {
    let start_time = Instant::now();

    let settings = load_settings(args.config.as_deref())?;

    let trace = TraceBuilder::new()
        .proxy_marker(settings.proxy_marker())
        .capture(args.skip)
        .context("Failed to capture stack")?;

    info!(
        "Captured {} frames in {:.2}ms",
        trace.len(),
        start_time.elapsed().as_secs_f64() * 1000.0
    );

    format_trace(&trace, &settings, args.format)
}
