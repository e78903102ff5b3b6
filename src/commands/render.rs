//! Render command implementation.
//!
//! The render command:
//! 1. Loads settings (aliases, bindings, proxy marker)
//! 2. Reads the stack dump
//! 3. Builds the trace
//! 4. Formats it for output

use super::models::{OutputFormat, RenderArgs};
use super::utils::load_settings;
use crate::output::{read_dump, StackDump, TraceReport};
use crate::stack::{SymbolNormalizer, Trace, TraceBuilder};
use crate::utils::Settings;
use anyhow::{Context, Result};
use log::{debug, info};

/// Execute the render command
///
/// **Public** - main entry point called from main.rs
///
/// # Returns
/// The formatted trace, ready to print
///
/// # Errors
/// * Unreadable settings or dump files
/// * Malformed stack entries
/// * Rewind past the end of the stack
pub fn execute_render(args: RenderArgs) -> Result<String> {
    info!("Rendering stack dump: {}", args.input.display());

    let settings = load_settings(args.config.as_deref())?;

    let dump = read_dump(&args.input)
        .with_context(|| format!("Failed to read stack dump {}", args.input.display()))?;

    let builder = TraceBuilder::new().proxy_marker(settings.proxy_marker());

    let trace = match dump {
        StackDump::Frames(frames) => {
            debug!("Dump holds {} raw frames", frames.len());
            builder.from_raw(frames, args.skip)?
        }
        StackDump::Error(report) => {
            debug!("Dump holds a thrown {}", report.type_name);
            builder.from_error(&report, args.skip)?.as_ref().clone()
        }
    };

    info!("Built trace with {} frames", trace.len());

    format_trace(&trace, &settings, args.format)
}

/// Format a trace using the aliases and bindings of `settings`
pub fn format_trace(trace: &Trace, settings: &Settings, format: OutputFormat) -> Result<String> {
    let registry = settings.registry();
    let catalog = settings.catalog();
    let normalizer = SymbolNormalizer::new(&registry).with_bindings(&catalog);

    let output = match format {
        OutputFormat::Text => trace.render(&normalizer),
        OutputFormat::Verbose => trace.render_verbose(&normalizer),
        OutputFormat::Json => TraceReport::digest(trace, &normalizer)
            .to_json_string()
            .context("Failed to serialize report")?,
        OutputFormat::Full => TraceReport::details(trace, &normalizer)
            .to_json_string()
            .context("Failed to serialize report")?,
    };

    Ok(output)
}

/// Validate render arguments
///
/// **Public** - can be called before execute_render for early validation
pub fn validate_args(args: &RenderArgs) -> Result<()> {
    if args.input.as_os_str().is_empty() {
        anyhow::bail!("Input path cannot be empty");
    }

    if !args.input.exists() {
        anyhow::bail!("Input file does not exist: {}", args.input.display());
    }

    if let Some(config) = &args.config {
        if !config.exists() {
            anyhow::bail!("Config file does not exist: {}", config.display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    fn dump_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_validate_args_missing_input() {
        let args = RenderArgs {
            input: PathBuf::from("/definitely/not/here.json"),
            ..Default::default()
        };
        assert!(validate_args(&args).is_err());

        let args = RenderArgs::default();
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_valid() {
        let file = dump_file("[]");
        let args = RenderArgs {
            input: file.path().to_path_buf(),
            ..Default::default()
        };
        assert!(validate_args(&args).is_ok());
    }

    #[test]
    fn test_render_text() {
        let file = dump_file(
            r#"[
                {"file": "/srv/app/src/a.php", "line": 3, "function": "inner"},
                {"file": "/srv/app/index.php", "line": 9, "function": "outer"}
            ]"#,
        );
        let config = dump_file("[aliases]\napp = \"/srv/app\"\n");

        let output = execute_render(RenderArgs {
            input: file.path().to_path_buf(),
            config: Some(config.path().to_path_buf()),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(
            output,
            "2: inner()\n  app://src/a.php : 3\n1: outer()\n  app://index.php : 9\n"
        );
    }

    #[test]
    fn test_render_rewind_out_of_range() {
        let file = dump_file(r#"[{"function": "only"}]"#);
        let result = execute_render(RenderArgs {
            input: file.path().to_path_buf(),
            skip: 1,
            ..Default::default()
        });
        assert!(result.is_err());
    }
}
