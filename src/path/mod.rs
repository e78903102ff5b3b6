//! Path normalization for display.
//!
//! Long absolute prefixes are replaced with short aliases so rendered
//! traces read the same on every machine.

pub mod alias;

pub use alias::{to_slashes, NormalizePath, Passthrough, PathAliasRegistry};
