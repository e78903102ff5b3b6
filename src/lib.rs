//! Trace Lens
//!
//! Captures call stacks and turns them into stable, normalized frame
//! records for display, logging and serialization. Absolute paths are
//! rewritten into short `alias://relative` names so output reads the
//! same across machines and deployment roots.
//!
//! ## Getting Started
//!
//! ```no_run
//! use trace_lens::path::PathAliasRegistry;
//! use trace_lens::stack::{stack_trace, SymbolNormalizer};
//!
//! let registry = PathAliasRegistry::new();
//! registry.register_alias("app", env!("CARGO_MANIFEST_DIR"));
//!
//! let trace = stack_trace(0).unwrap();
//! print!("{}", trace.render(&SymbolNormalizer::new(&registry)));
//! ```
//!
//! The `trace-lens` CLI renders stack dumps written by other runtimes:
//!
//! ```bash
//! trace-lens render --input error.json --config trace-lens.toml
//! ```

pub mod commands;
pub mod output;
pub mod path;
pub mod stack;
pub mod utils;
