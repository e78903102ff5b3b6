//! Normalized call-stack entries.
//!
//! A [`FrameRecord`] pairs the location currently executing inside a
//! callable (origin) with the location it was invoked from (calling),
//! plus the callable's identity and captured arguments.

use super::builder::TraceBuilder;
use super::raw::{ArgValue, Location, RawFrame};
use super::symbol::SymbolNormalizer;
use crate::utils::config::DISPATCH_MARKERS;
use crate::utils::error::TraceError;
use serde::Serialize;
use std::fmt;

/// How the callable of a frame was invoked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum InvocationKind {
    StaticMethod,
    InstanceMethod,
    NamespacedFunction,
    GlobalFunction,
    None,
}

impl InvocationKind {
    /// Operator token shown between type and function
    pub fn operator(&self) -> &'static str {
        match self {
            InvocationKind::StaticMethod => "::",
            InvocationKind::InstanceMethod => "->",
            _ => "",
        }
    }

    fn from_operator(index: usize, operator: &str) -> Result<Self, TraceError> {
        match operator {
            "::" => Ok(InvocationKind::StaticMethod),
            "->" => Ok(InvocationKind::InstanceMethod),
            other => Err(TraceError::malformed(
                index,
                format!("unknown invocation operator '{}'", other),
            )),
        }
    }
}

/// What to append after the function name in a signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArgStyle {
    /// No argument section at all
    Omit,
    /// Argument count in parentheses
    #[default]
    Count,
    /// Every argument rendered
    Full,
}

/// Namespace separator style of a qualified name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Separator {
    /// Script runtimes: `App\Models\User`
    #[default]
    Backslash,
    /// Rust paths: `crate::module::Type`
    DoubleColon,
}

impl Separator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Separator::Backslash => "\\",
            Separator::DoubleColon => "::",
        }
    }
}

/// Split a qualified name at its last separator
///
/// Returns `(namespace, name, separator)`.
pub(crate) fn split_qualified(name: &str) -> (Option<&str>, &str, Separator) {
    let backslash = name.rfind('\\');
    let double_colon = name.rfind("::");

    match (backslash, double_colon) {
        (Some(b), Some(d)) if d > b => (Some(&name[..d]), &name[d + 2..], Separator::DoubleColon),
        (Some(b), _) => (Some(&name[..b]), &name[b + 1..], Separator::Backslash),
        (None, Some(d)) => (Some(&name[..d]), &name[d + 2..], Separator::DoubleColon),
        (None, None) => (None, name, Separator::Backslash),
    }
}

/// Callee shape of a raw entry
enum Callee {
    /// No callable, top-level code
    TopLevel,
    /// Intercepted dynamic call; the real name is the first argument
    Dispatched,
    Named(String),
}

impl Callee {
    fn classify(function: Option<String>) -> Self {
        match function {
            None => Callee::TopLevel,
            Some(name) if DISPATCH_MARKERS.contains(&name.as_str()) => Callee::Dispatched,
            Some(name) => Callee::Named(name),
        }
    }
}

/// One normalized entry of a stack trace
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRecord {
    function: Option<String>,
    type_name: Option<String>,
    namespace: Option<String>,
    separator: Separator,
    invocation_kind: InvocationKind,
    arguments: Vec<ArgValue>,
    origin_file: Option<String>,
    origin_line: Option<u32>,
    calling_file: Option<String>,
    calling_line: Option<u32>,
}

impl FrameRecord {
    /// Capture the frame of the caller, `skip` levels further out
    pub fn capture(skip: usize) -> Result<Self, TraceError> {
        let trace = TraceBuilder::new().capture(skip.saturating_add(1))?;
        let depth = trace.len();

        trace
            .into_frames()
            .into_iter()
            .next()
            .ok_or(TraceError::StackRewindOutOfRange {
                requested: skip,
                depth,
            })
    }

    /// Build from a raw entry and the origin borrowed from the frame above
    pub fn from_raw(raw: RawFrame, origin: Location) -> Result<Self, TraceError> {
        Self::build(0, raw, origin)
    }

    pub(crate) fn build(index: usize, raw: RawFrame, origin: Location) -> Result<Self, TraceError> {
        let RawFrame {
            file,
            line,
            function,
            class,
            operator,
            mut args,
        } = raw;

        if function.is_none() && (class.is_some() || operator.is_some()) {
            return Err(TraceError::malformed(
                index,
                "class or operator given without a function",
            ));
        }

        let explicit_kind = operator
            .as_deref()
            .map(|op| InvocationKind::from_operator(index, op))
            .transpose()?;

        let mut namespace = None;
        let mut type_name = None;
        let mut separator = Separator::default();

        let function = match Callee::classify(function) {
            Callee::TopLevel => None,
            Callee::Dispatched => match args.first() {
                Some(ArgValue::Str(real)) => {
                    let real = real.clone();
                    args.remove(0);
                    Some(real)
                }
                _ => {
                    return Err(TraceError::malformed(
                        index,
                        "dynamic dispatch without a method name argument",
                    ))
                }
            },
            Callee::Named(name) => Some(name),
        };

        let function = if let Some(class) = class.as_deref() {
            let (ns, short, sep) = split_qualified(class);
            namespace = ns.map(str::to_string);
            type_name = Some(short.to_string());
            separator = sep;
            function
        } else {
            function.map(|name| {
                let (ns, short, sep) = split_qualified(&name);
                namespace = ns.map(str::to_string);
                separator = sep;
                short.to_string()
            })
        };

        let invocation_kind = match explicit_kind {
            Some(kind) => kind,
            None if namespace.is_some() => InvocationKind::NamespacedFunction,
            None if function.is_some() => InvocationKind::GlobalFunction,
            None => InvocationKind::None,
        };

        Ok(Self {
            function,
            type_name,
            namespace,
            separator,
            invocation_kind,
            arguments: args,
            origin_file: origin.file,
            origin_line: origin.line,
            calling_file: file,
            calling_line: line,
        })
    }

    pub fn function(&self) -> Option<&str> {
        self.function.as_deref()
    }

    /// Unqualified containing type name
    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn has_namespace(&self) -> bool {
        self.namespace.is_some()
    }

    pub fn has_class(&self) -> bool {
        self.type_name.is_some()
    }

    /// Fully qualified containing type
    pub fn class(&self) -> Option<String> {
        let type_name = self.type_name.as_deref()?;
        Some(match &self.namespace {
            Some(ns) => format!("{}{}{}", ns, self.separator.as_str(), type_name),
            None => type_name.to_string(),
        })
    }

    pub fn separator(&self) -> Separator {
        self.separator
    }

    pub fn invocation_kind(&self) -> InvocationKind {
        self.invocation_kind
    }

    pub fn is_static_method(&self) -> bool {
        self.invocation_kind == InvocationKind::StaticMethod
    }

    pub fn is_instance_method(&self) -> bool {
        self.invocation_kind == InvocationKind::InstanceMethod
    }

    pub fn is_namespaced_function(&self) -> bool {
        self.invocation_kind == InvocationKind::NamespacedFunction
    }

    pub fn is_global_function(&self) -> bool {
        self.invocation_kind == InvocationKind::GlobalFunction
    }

    pub fn arguments(&self) -> &[ArgValue] {
        &self.arguments
    }

    pub fn has_arguments(&self) -> bool {
        !self.arguments.is_empty()
    }

    pub fn count_arguments(&self) -> usize {
        self.arguments.len()
    }

    /// File currently executing inside this callable
    pub fn origin_file(&self) -> Option<&str> {
        self.origin_file.as_deref()
    }

    pub fn origin_line(&self) -> Option<u32> {
        self.origin_line
    }

    pub fn origin(&self) -> Location {
        Location {
            file: self.origin_file.clone(),
            line: self.origin_line,
        }
    }

    /// File this callable was invoked from
    pub fn calling_file(&self) -> Option<&str> {
        self.calling_file.as_deref()
    }

    pub fn calling_line(&self) -> Option<u32> {
        self.calling_line
    }

    pub fn calling(&self) -> Location {
        Location {
            file: self.calling_file.clone(),
            line: self.calling_line,
        }
    }

    /// Signature rendered without path aliases or facade bindings
    pub fn signature(&self, args: ArgStyle, include_namespace: bool) -> String {
        SymbolNormalizer::plain().build_signature(self, args, include_namespace)
    }

    /// Argument list rendered without path aliases or facade bindings
    pub fn argument_string(&self) -> String {
        SymbolNormalizer::plain().build_argument_string(&self.arguments)
    }
}

impl fmt::Display for FrameRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&SymbolNormalizer::plain().describe(self))
    }
}
