//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the various library components to perform user tasks.

pub mod capture;
pub mod models;
pub mod render;
pub mod utils;

// Re-export main command functions
pub use capture::execute_capture;
pub use models::{CaptureArgs, OutputFormat, RenderArgs};
pub use render::{execute_render, format_trace, validate_args};
pub use utils::{display_schema, display_version, load_settings, normalize_paths};
