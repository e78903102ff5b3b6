//! Configuration and constants for trace capture and rendering.

use super::error::ConfigError;
use crate::path::PathAliasRegistry;
use crate::stack::BindingCatalog;
use log::debug;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Current report schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Maximum number of characters of a string argument shown in signatures
pub const ARG_STRING_LIMIT: usize = 16;

/// Files ending with this are facade trampolines and never shown
pub const DEFAULT_PROXY_MARKER: &str = "Veneer/ProxyTrait.php";

// A facade binding type is recognised by either of these
pub const BINDING_FILE_MARKER: &str = "veneer/src/Veneer/Binding.php";
pub const BINDING_NAMESPACE_PREFIX: &str = "DecodeLabs\\Veneer\\Binding\\";

/// Function names used by runtimes for intercepted dynamic calls
pub const DISPATCH_MARKERS: &[&str] = &["__call", "__callStatic"];

/// Function name of the synthetic frame prepended for thrown errors
pub const CONSTRUCTOR_MARKER: &str = "__construct";

/// Anything containing this is rendered as an anonymous closure
pub const CLOSURE_MARKER: &str = "{closure}";

/// Suffix tagging alias entries that map a canonicalised (symlink-free) prefix
pub const RESOLVED_ALIAS_TAG: &str = "*";

/// Settings file contents
///
/// Every section is optional, an empty file is a valid config.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Alias name -> absolute path prefix
    pub aliases: BTreeMap<String, String>,

    /// Facade binding type -> short display alias
    pub bindings: BTreeMap<String, String>,

    /// Override for the proxy trampoline file marker
    pub proxy_marker: Option<String>,
}

impl Settings {
    /// Load settings from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!("Loading settings from: {}", path.display());

        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    /// Parse settings from TOML text
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(text)?;

        debug!(
            "Settings: {} aliases, {} bindings",
            settings.aliases.len(),
            settings.bindings.len()
        );

        Ok(settings)
    }

    /// Build an alias registry populated from the `[aliases]` table
    pub fn registry(&self) -> PathAliasRegistry {
        let registry = PathAliasRegistry::new();
        registry.register_aliases(
            self.aliases
                .iter()
                .map(|(name, prefix)| (name.as_str(), prefix.as_str())),
        );
        registry
    }

    /// Build a binding catalog from the `[bindings]` table
    pub fn catalog(&self) -> BindingCatalog {
        let mut catalog = BindingCatalog::new();
        for (class, alias) in &self.bindings {
            catalog.insert(class.clone(), alias.clone());
        }
        catalog
    }

    /// Proxy marker to filter on, falling back to the default
    pub fn proxy_marker(&self) -> &str {
        self.proxy_marker.as_deref().unwrap_or(DEFAULT_PROXY_MARKER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_settings() {
        let settings = Settings::from_toml("").unwrap();
        assert!(settings.aliases.is_empty());
        assert_eq!(settings.proxy_marker(), DEFAULT_PROXY_MARKER);
    }

    #[test]
    fn test_settings_tables() {
        let settings = Settings::from_toml(
            r#"
            proxy_marker = "Proxy/Trampoline.php"

            [aliases]
            app = "/var/www/app"

            [bindings]
            "DecodeLabs\\Veneer\\Binding\\Glitch" = "Glitch"
            "#,
        )
        .unwrap();

        assert_eq!(settings.proxy_marker(), "Proxy/Trampoline.php");
        assert_eq!(
            settings.registry().normalize_str("/var/www/app/src/x.php"),
            "app://src/x.php"
        );
        assert_eq!(
            settings
                .catalog()
                .alias_for("DecodeLabs\\Veneer\\Binding\\Glitch"),
            Some("Glitch")
        );
    }

    #[test]
    fn test_invalid_settings() {
        assert!(Settings::from_toml("aliases = 3").is_err());
    }
}
