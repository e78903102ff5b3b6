//! Alias table for rewriting absolute paths into `alias://relative` form.
//!
//! The table is populated once at startup and read for every rendered path.
//! Entries are kept sorted by descending prefix length so the first match
//! is always the most specific one.

use crate::utils::config::RESOLVED_ALIAS_TAG;
use log::debug;
use parking_lot::Mutex;
use std::path::Path;

/// Anything able to shorten a path for display
pub trait NormalizePath: Send + Sync {
    /// Rewrite `path` for display
    fn normalize_path(&self, path: &str) -> String;
}

/// Fallback used when no alias table has been set up
///
/// Only separators are normalized.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl NormalizePath for Passthrough {
    fn normalize_path(&self, path: &str) -> String {
        to_slashes(path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AliasEntry {
    name: String,
    prefix: String,
}

impl AliasEntry {
    fn is_resolved(&self) -> bool {
        self.name.ends_with(RESOLVED_ALIAS_TAG)
    }

    fn display_name(&self) -> &str {
        self.name
            .strip_suffix(RESOLVED_ALIAS_TAG)
            .unwrap_or(&self.name)
    }
}

/// Process-wide alias table
///
/// Share it behind an `Arc` or by reference; registration is serialized
/// by an internal mutex.
#[derive(Debug, Default)]
pub struct PathAliasRegistry {
    entries: Mutex<Vec<AliasEntry>>,
}

impl PathAliasRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a single alias
    ///
    /// If the prefix resolves to a different canonical path (symlinks),
    /// the canonical prefix is registered as well under the same name.
    pub fn register_alias(&self, name: &str, prefix: impl AsRef<Path>) {
        let mut entries = self.entries.lock();
        insert_alias(&mut entries, name, prefix.as_ref());
        sort_entries(&mut entries);
    }

    /// Register many aliases with a single re-sort at the end
    pub fn register_aliases<N, P, I>(&self, aliases: I)
    where
        N: AsRef<str>,
        P: AsRef<Path>,
        I: IntoIterator<Item = (N, P)>,
    {
        let mut entries = self.entries.lock();
        for (name, prefix) in aliases {
            insert_alias(&mut entries, name.as_ref(), prefix.as_ref());
        }
        sort_entries(&mut entries);
    }

    /// Normalize an optional path; `None` stays `None`
    pub fn normalize(&self, path: Option<&str>) -> Option<String> {
        path.map(|p| self.normalize_str(p))
    }

    /// Rewrite `path` using the longest matching alias prefix
    pub fn normalize_str(&self, path: &str) -> String {
        let path = to_slashes(path);
        if path.is_empty() {
            return path;
        }

        let test = format!("{}/", path);
        let entries = self.entries.lock();

        for entry in entries.iter() {
            if test.starts_with(&entry.prefix) {
                let remainder = path.get(entry.prefix.len()..).unwrap_or("");
                return format!("{}://{}", entry.display_name(), remainder);
            }
        }

        path
    }

    /// User-registered aliases in lookup order, resolved entries excluded
    pub fn aliases(&self) -> Vec<(String, String)> {
        self.entries
            .lock()
            .iter()
            .filter(|e| !e.is_resolved())
            .map(|e| (e.name.clone(), e.prefix.clone()))
            .collect()
    }

    /// Number of table entries, resolved ones included
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl NormalizePath for PathAliasRegistry {
    fn normalize_path(&self, path: &str) -> String {
        self.normalize_str(path)
    }
}

/// Convert back-slash separators to forward slashes
pub fn to_slashes(path: &str) -> String {
    path.replace('\\', "/")
}

fn with_trailing_slash(path: &str) -> String {
    let mut path = to_slashes(path);
    if !path.ends_with('/') {
        path.push('/');
    }
    path
}

fn insert_alias(entries: &mut Vec<AliasEntry>, name: &str, prefix: &Path) {
    let literal = with_trailing_slash(&prefix.to_string_lossy());
    debug!("Registering path alias {}:// -> {}", name, literal);
    upsert(entries, name.to_string(), literal.clone());

    let resolved_name = format!("{}{}", name, RESOLVED_ALIAS_TAG);
    entries.retain(|e| e.name != resolved_name);

    // Best effort: missing targets keep the literal entry only
    match std::fs::canonicalize(prefix) {
        Ok(real) => {
            let real = with_trailing_slash(&real.to_string_lossy());
            if real != literal {
                debug!("Alias {} resolves to {}", name, real);
                upsert(entries, resolved_name, real);
            }
        }
        Err(e) => {
            debug!("Could not resolve alias {} ({}): {}", name, literal, e);
        }
    }
}

fn upsert(entries: &mut Vec<AliasEntry>, name: String, prefix: String) {
    if let Some(existing) = entries.iter_mut().find(|e| e.name == name) {
        existing.prefix = prefix;
    } else {
        entries.push(AliasEntry { name, prefix });
    }
}

fn sort_entries(entries: &mut [AliasEntry]) {
    entries.sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));
}
