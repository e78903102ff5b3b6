use clap::ValueEnum;
use std::path::PathBuf;

/// How a rendered trace is printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Numbered listing with argument counts
    #[default]
    Text,
    /// Numbered listing with every argument
    Verbose,
    /// JSON report with file, line and signature per frame
    Json,
    /// JSON report with every frame field
    Full,
}

/// Arguments for the render command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone, Default)]
pub struct RenderArgs {
    /// JSON stack dump (frame array or error report)
    pub input: PathBuf,

    /// Optional settings file with aliases and bindings
    pub config: Option<PathBuf>,

    /// Innermost entries to skip
    pub skip: usize,

    pub format: OutputFormat,
}

/// Arguments for the capture command
#[derive(Debug, Clone, Default)]
pub struct CaptureArgs {
    pub config: Option<PathBuf>,

    pub skip: usize,

    pub format: OutputFormat,
}
