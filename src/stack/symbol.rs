//! Display normalization for runtime-generated symbol names.
//!
//! Runtimes encode anonymous types and evaluated code into class names
//! (file paths, line numbers, memory addresses joined by colons). The
//! normalizer turns those into short, stable strings and renders frame
//! signatures and argument lists.

use super::frame::{ArgStyle, FrameRecord};
use super::raw::ArgValue;
use crate::path::{NormalizePath, Passthrough};
use crate::utils::config::{
    ARG_STRING_LIMIT, BINDING_FILE_MARKER, BINDING_NAMESPACE_PREFIX, CLOSURE_MARKER,
};
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

static ANON_LINE_RE: OnceLock<Regex> = OnceLock::new();
static ANON_ADDRESS_RE: OnceLock<Regex> = OnceLock::new();
static EVAL_RE: OnceLock<Regex> = OnceLock::new();

fn anon_line_re() -> &'static Regex {
    ANON_LINE_RE.get_or_init(|| {
        Regex::new(r"^class@anonymous(.+)(\(([0-9]+)\))").expect("anonymous line regex is valid")
    })
}

fn anon_address_re() -> &'static Regex {
    ANON_ADDRESS_RE.get_or_init(|| {
        Regex::new(r"^class@anonymous(.+)(0x[0-9a-f]+)").expect("anonymous address regex is valid")
    })
}

fn eval_re() -> &'static Regex {
    EVAL_RE.get_or_init(|| Regex::new(r"^eval\(\)'d").expect("eval regex is valid"))
}

/// Capability of a facade binding type to be shown by a short name
pub trait DisplayAlias {
    fn display_alias() -> &'static str;
}

/// Known facade binding types and their display aliases
#[derive(Debug, Clone, Default)]
pub struct BindingCatalog {
    aliases: HashMap<String, String>,
}

impl BindingCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a binding type under its qualified runtime name
    pub fn register<T: DisplayAlias>(&mut self, class: impl Into<String>) -> &mut Self {
        self.insert(class, T::display_alias())
    }

    pub fn insert(&mut self, class: impl Into<String>, alias: impl Into<String>) -> &mut Self {
        self.aliases.insert(class.into(), alias.into());
        self
    }

    pub fn alias_for(&self, class: &str) -> Option<&str> {
        self.aliases.get(class).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

/// Renders symbol names, argument lists and signatures
///
/// Borrows the path hook and binding catalog it renders with; build one
/// per render pass or keep it alongside the registry.
#[derive(Clone, Copy)]
pub struct SymbolNormalizer<'a> {
    paths: &'a dyn NormalizePath,
    bindings: Option<&'a BindingCatalog>,
}

impl Default for SymbolNormalizer<'static> {
    fn default() -> Self {
        Self::plain()
    }
}

impl<'a> SymbolNormalizer<'a> {
    /// Normalizer rendering paths through `paths`
    pub fn new(paths: &'a dyn NormalizePath) -> Self {
        Self {
            paths,
            bindings: None,
        }
    }

    /// Normalizer with no alias table, paths only get separator cleanup
    pub fn plain() -> SymbolNormalizer<'static> {
        SymbolNormalizer {
            paths: &Passthrough,
            bindings: None,
        }
    }

    /// Resolve facade bindings through `bindings`
    pub fn with_bindings(mut self, bindings: &'a BindingCatalog) -> Self {
        self.bindings = Some(bindings);
        self
    }

    /// Render a path for display
    pub fn normalize_path(&self, path: Option<&str>) -> Option<String> {
        path.map(|p| self.paths.normalize_path(p))
    }

    /// Short alias (`~Name`) for facade binding types, if known
    fn facade_alias(&self, class: &str) -> Option<String> {
        let is_binding =
            class.contains(BINDING_FILE_MARKER) || class.starts_with(BINDING_NAMESPACE_PREFIX);
        if !is_binding {
            return None;
        }

        self.bindings?
            .alias_for(class)
            .map(|alias| format!("~{}", alias))
    }

    /// Turn a raw runtime class name into a stable display string
    pub fn normalize_class_name(&self, class: &str) -> String {
        if let Some(alias) = self.facade_alias(class) {
            return alias;
        }

        let mut name: Vec<String> = Vec::new();

        for part in segments(class) {
            let part = part.trim();

            if let Some(caps) = anon_line_re().captures(part) {
                let path = self.paths.normalize_path(caps[1].trim());
                name.push(format!("{} : {}", path, &caps[3]));
            } else if let Some(caps) = anon_address_re().captures(part) {
                let raw = caps[1].trim();
                let mut short = self.paths.normalize_path(raw);

                // Never leak an unaliased absolute path
                if short == raw {
                    short = basename(&short);
                }

                name.push(format!("@anonymous : {}", short));
            } else if eval_re().is_match(part) {
                name = vec![format!("eval[ {} ]", name.join(" : "))];
                break;
            } else {
                name.push(part.to_string());
            }
        }

        name.join(" : ")
    }

    /// Render one argument value
    pub fn render_argument(&self, arg: &ArgValue) -> String {
        match arg {
            ArgValue::Str(s) => {
                if s.chars().count() > ARG_STRING_LIMIT {
                    let head: String = s.chars().take(ARG_STRING_LIMIT).collect();
                    format!("'{}...'", head)
                } else {
                    format!("'{}'", s)
                }
            }
            ArgValue::List(items) => format!("[{}]", items.len()),
            ArgValue::Map(items) => format!("[{}]", items.len()),
            ArgValue::Object(object) => self.normalize_class_name(&object.class),
            ArgValue::Bool(b) => b.to_string(),
            ArgValue::Null => "null".to_string(),
            ArgValue::Int(i) => i.to_string(),
            ArgValue::Float(f) => f.to_string(),
        }
    }

    /// Render an argument list as `(a, b, c)`
    pub fn build_argument_string(&self, args: &[ArgValue]) -> String {
        let rendered: Vec<String> = args.iter().map(|arg| self.render_argument(arg)).collect();
        format!("({})", rendered.join(", "))
    }

    /// Assemble the display signature of a frame
    pub fn build_signature(
        &self,
        frame: &FrameRecord,
        args: ArgStyle,
        include_namespace: bool,
    ) -> String {
        let mut output = String::new();

        if include_namespace {
            if let Some(namespace) = frame.namespace() {
                output.push_str(namespace);
                output.push_str(frame.separator().as_str());
            }
        }

        if let (Some(type_name), Some(class)) = (frame.type_name(), frame.class()) {
            let display = match self.facade_alias(&class) {
                Some(alias) => {
                    // Facade aliases replace the whole qualified name
                    output.clear();
                    alias
                }
                None => self.normalize_class_name(type_name),
            };
            output.push_str(&display);
        }

        output.push_str(frame.invocation_kind().operator());

        if let Some(function) = frame.function() {
            if function.contains(CLOSURE_MARKER) {
                output.push_str(CLOSURE_MARKER);
            } else {
                output.push_str(function);
            }
        }

        match args {
            ArgStyle::Full => output.push_str(&self.build_argument_string(frame.arguments())),
            ArgStyle::Count => {
                if frame.arguments().is_empty() {
                    output.push_str("()");
                } else {
                    output.push_str(&format!("({})", frame.arguments().len()));
                }
            }
            ArgStyle::Omit => {}
        }

        output
    }

    /// One-line rendering: signature and calling location
    pub fn describe(&self, frame: &FrameRecord) -> String {
        format!(
            "{} {}",
            self.build_signature(frame, ArgStyle::Count, true),
            self.render_location(frame.calling_file(), frame.calling_line())
        )
    }

    /// `file : line` with unknown halves shown as `[internal]` and `?`
    pub fn render_location(&self, file: Option<&str>, line: Option<u32>) -> String {
        let file = self
            .normalize_path(file)
            .unwrap_or_else(|| "[internal]".to_string());
        let line = line.map_or_else(|| "?".to_string(), |l| l.to_string());
        format!("{} : {}", file, line)
    }
}

impl std::fmt::Debug for SymbolNormalizer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymbolNormalizer")
            .field("bindings", &self.bindings)
            .finish_non_exhaustive()
    }
}

/// Split on the runtime's single `:` joiner, leaving `::` paths whole
fn segments(class: &str) -> Vec<&str> {
    let bytes = class.as_bytes();
    let mut parts = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b':' {
            if bytes.get(i + 1) == Some(&b':') {
                i += 2;
                continue;
            }
            parts.push(&class[start..i]);
            start = i + 1;
        }
        i += 1;
    }

    parts.push(&class[start..]);
    parts
}

fn basename(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::PathAliasRegistry;
    use crate::stack::raw::{Location, RawFrame};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_anonymous_with_line() {
        let normalizer = SymbolNormalizer::plain();
        assert_eq!(
            normalizer.normalize_class_name("class@anonymous/var/www/app/x.php(42)"),
            "/var/www/app/x.php : 42"
        );
    }

    #[test]
    fn test_anonymous_with_address() {
        let normalizer = SymbolNormalizer::plain();
        assert_eq!(
            normalizer.normalize_class_name("class@anonymous/var/www/app/src/x.php0x7f3a"),
            "@anonymous : x.php"
        );

        let registry = PathAliasRegistry::new();
        registry.register_alias("app", "/var/www/app");
        let normalizer = SymbolNormalizer::new(&registry);
        assert_eq!(
            normalizer.normalize_class_name("class@anonymous/var/www/app/src/x.php0x7f3a"),
            "@anonymous : app://src/x.php"
        );
    }

    #[test]
    fn test_eval_collapses_prefix() {
        let normalizer = SymbolNormalizer::plain();
        assert_eq!(
            normalizer.normalize_class_name("Outer:Inner:eval()'d code:Tail"),
            "eval[ Outer : Inner ]"
        );
        assert_eq!(
            normalizer.normalize_class_name("class@anonymous/in/X.php(3) : eval()'d code:1$0"),
            "eval[ /in/X.php : 3 ]"
        );
    }

    #[test]
    fn test_double_colon_paths_kept_whole() {
        let normalizer = SymbolNormalizer::plain();
        assert_eq!(normalizer.normalize_class_name("std::io::Error"), "std::io::Error");
        assert_eq!(
            normalizer.build_argument_string(&[ArgValue::object("std::io::Error")]),
            "(std::io::Error)"
        );
        assert_eq!(
            normalizer.normalize_class_name("core::fmt::Error:Detail"),
            "core::fmt::Error : Detail"
        );
    }

    #[test]
    fn test_plain_class_untouched() {
        let normalizer = SymbolNormalizer::plain();
        assert_eq!(normalizer.normalize_class_name("Runner"), "Runner");
    }

    struct GlitchBinding;

    impl DisplayAlias for GlitchBinding {
        fn display_alias() -> &'static str {
            "Glitch"
        }
    }

    #[test]
    fn test_facade_alias() {
        let mut catalog = BindingCatalog::new();
        catalog.register::<GlitchBinding>("DecodeLabs\\Veneer\\Binding\\Glitch");
        let normalizer = SymbolNormalizer::plain().with_bindings(&catalog);

        assert_eq!(
            normalizer.normalize_class_name("DecodeLabs\\Veneer\\Binding\\Glitch"),
            "~Glitch"
        );
        // Binding convention without a registered alias stays verbatim
        assert_eq!(
            normalizer.normalize_class_name("DecodeLabs\\Veneer\\Binding\\Other"),
            "DecodeLabs\\Veneer\\Binding\\Other"
        );
        // Registered alias but not a binding type
        catalog.insert("App\\Thing", "Thing");
        let normalizer = SymbolNormalizer::plain().with_bindings(&catalog);
        assert_eq!(normalizer.normalize_class_name("App\\Thing"), "App\\Thing");
    }

    #[test]
    fn test_facade_signature_drops_namespace() {
        let mut catalog = BindingCatalog::new();
        catalog.register::<GlitchBinding>("DecodeLabs\\Veneer\\Binding\\Glitch");
        let normalizer = SymbolNormalizer::plain().with_bindings(&catalog);

        let frame = FrameRecord::from_raw(
            RawFrame::method("DecodeLabs\\Veneer\\Binding\\Glitch", "::", "dump"),
            Location::unknown(),
        )
        .unwrap();

        assert_eq!(
            normalizer.build_signature(&frame, ArgStyle::Count, true),
            "~Glitch::dump()"
        );
        assert_eq!(
            SymbolNormalizer::plain().build_signature(&frame, ArgStyle::Count, true),
            "DecodeLabs\\Veneer\\Binding\\Glitch::dump()"
        );
    }

    #[test]
    fn test_argument_string() {
        let normalizer = SymbolNormalizer::plain();
        let args = vec![
            ArgValue::from("a-very-long-string-over-16-chars"),
            ArgValue::Int(42),
            ArgValue::Bool(true),
            ArgValue::Null,
            ArgValue::from(vec![1i64, 2, 3]),
        ];

        assert_eq!(
            normalizer.build_argument_string(&args),
            "('a-very-long-stri...', 42, true, null, [3])"
        );
    }

    #[test]
    fn test_argument_string_short_and_objects() {
        let normalizer = SymbolNormalizer::plain();
        let args = vec![
            ArgValue::from("short"),
            ArgValue::Float(1.5),
            ArgValue::object("class@anonymous/tmp/y.php(7)"),
        ];

        assert_eq!(
            normalizer.build_argument_string(&args),
            "('short', 1.5, /tmp/y.php : 7)"
        );
        assert_eq!(normalizer.build_argument_string(&[]), "()");
    }
}
