use crate::utils::config::SCHEMA_VERSION;
use crate::utils::Settings;
use anyhow::{Context, Result};
use std::path::Path;

/// Load settings from `path`, or defaults when no file is given
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    match path {
        Some(path) => Settings::load(path)
            .with_context(|| format!("Failed to load settings from {}", path.display())),
        None => Ok(Settings::default()),
    }
}

/// Normalize each path with the aliases of `settings`
pub fn normalize_paths(paths: &[String], settings: &Settings) -> Vec<String> {
    let registry = settings.registry();
    paths.iter().map(|path| registry.normalize_str(path)).collect()
}

/// Display schema information
pub fn display_schema(show_details: bool) {
    println!("Trace Lens Report Schema");
    println!("Current Version: {}", SCHEMA_VERSION);
    println!();

    if show_details {
        println!("Schema Structure:");
        println!("  version: string          - Schema version (e.g., '1.0.0')");
        println!("  generated_at: string     - ISO 8601 timestamp");
        println!("  frame_count: number      - Number of frames");
        println!("  frames: array            - Innermost frame first");
        println!("    file: string?          - Aliased origin file");
        println!("    line: number?          - Origin line");
        println!("    signature: string      - Display signature (json format)");
        println!("    function: string?      - Function name (full format)");
        println!("    class: string?         - Containing type (full format)");
        println!("    namespace: string?     - Namespace (full format)");
        println!("    type: string           - Invocation kind (full format)");
        println!("    args: array            - Raw arguments (full format)");
    } else {
        println!("Use --show for detailed schema information");
    }
}

/// Display version information
pub fn display_version() {
    println!("Trace Lens v{}", env!("CARGO_PKG_VERSION"));
    println!("Report Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("Stack capture and normalization into stable frame records.");
}
