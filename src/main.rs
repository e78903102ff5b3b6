//! Trace Lens CLI
//!
//! Renders stack dumps into normalized, aliased traces and captures the
//! CLI's own stack for inspection.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use trace_lens::commands::{
    display_schema, display_version, execute_capture, execute_render, load_settings,
    normalize_paths, validate_args, CaptureArgs, OutputFormat, RenderArgs,
};

/// Trace Lens - stable, normalized stack traces
#[derive(Parser, Debug)]
#[command(name = "trace-lens")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a stack dump (raw frame array or error report)
    Render {
        /// Path to the JSON stack dump
        #[arg(short, long)]
        input: PathBuf,

        /// Settings file with path aliases and bindings
        #[arg(short, long, env = "TRACE_LENS_CONFIG")]
        config: Option<PathBuf>,

        /// Number of innermost entries to rewind
        #[arg(short, long, default_value = "0")]
        skip: usize,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Rewrite paths into their aliased form
    Normalize {
        /// Paths to normalize
        #[arg(required = true)]
        paths: Vec<String>,

        /// Settings file with path aliases
        #[arg(short, long, env = "TRACE_LENS_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Capture and render this process's stack
    Capture {
        /// Number of innermost entries to rewind
        #[arg(short, long, default_value = "0")]
        skip: usize,

        /// Settings file with path aliases and bindings
        #[arg(short, long, env = "TRACE_LENS_CONFIG")]
        config: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Display report schema information
    Schema {
        /// Show full schema details
        #[arg(long)]
        show: bool,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    match cli.command {
        Commands::Render {
            input,
            config,
            skip,
            format,
        } => {
            let args = RenderArgs {
                input,
                config,
                skip,
                format,
            };

            validate_args(&args)?;
            print!("{}", execute_render(args)?);
        }

        Commands::Normalize { paths, config } => {
            let settings = load_settings(config.as_deref())?;
            for path in normalize_paths(&paths, &settings) {
                println!("{}", path);
            }
        }

        Commands::Capture {
            skip,
            config,
            format,
        } => {
            let args = CaptureArgs {
                config,
                skip,
                format,
            };
            print!("{}", execute_capture(args)?);
        }

        Commands::Schema { show } => {
            display_schema(show);
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
