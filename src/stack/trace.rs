//! The finished, immutable stack trace.

use super::frame::{ArgStyle, FrameRecord, InvocationKind};
use super::raw::ArgValue;
use super::symbol::SymbolNormalizer;
use crate::utils::error::TraceError;
use serde::Serialize;
use std::fmt;
use std::ops::Index;

/// Full export of one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameDetails {
    pub file: Option<String>,
    pub line: Option<u32>,
    pub function: Option<String>,
    pub class: Option<String>,
    pub namespace: Option<String>,
    #[serde(rename = "type")]
    pub invocation_kind: InvocationKind,
    pub args: Vec<ArgValue>,
}

/// Reduced, JSON friendly export of one frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameDigest {
    pub file: Option<String>,
    pub line: Option<u32>,
    pub signature: String,
}

/// Ordered frames, innermost first
///
/// Frames can be read but never replaced or removed once built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trace {
    frames: Vec<FrameRecord>,
}

impl Trace {
    pub fn new(frames: Vec<FrameRecord>) -> Self {
        Self { frames }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Same as [`Trace::len`]
    pub fn count(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&FrameRecord> {
        self.frames.get(index)
    }

    pub fn first_frame(&self) -> Option<&FrameRecord> {
        self.frames.first()
    }

    /// Origin file of the innermost frame
    pub fn file(&self) -> Option<&str> {
        self.first_frame().and_then(FrameRecord::origin_file)
    }

    /// Origin line of the innermost frame
    pub fn line(&self) -> Option<u32> {
        self.first_frame().and_then(FrameRecord::origin_line)
    }

    pub fn frames(&self) -> &[FrameRecord] {
        &self.frames
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FrameRecord> {
        self.frames.iter()
    }

    pub fn into_frames(self) -> Vec<FrameRecord> {
        self.frames
    }

    /// Always fails, traces are immutable
    pub fn set(&self, _index: usize, _frame: FrameRecord) -> Result<(), TraceError> {
        Err(TraceError::ImmutableCollection)
    }

    /// Always fails, traces are immutable
    pub fn remove(&self, _index: usize) -> Result<FrameRecord, TraceError> {
        Err(TraceError::ImmutableCollection)
    }

    /// Export every frame with all of its fields
    pub fn to_array(&self, normalizer: &SymbolNormalizer<'_>) -> Vec<FrameDetails> {
        self.frames
            .iter()
            .map(|frame| FrameDetails {
                file: normalizer.normalize_path(frame.origin_file()),
                line: frame.origin_line(),
                function: frame.function().map(str::to_string),
                class: frame.type_name().map(str::to_string),
                namespace: frame.namespace().map(str::to_string),
                invocation_kind: frame.invocation_kind(),
                args: frame.arguments().to_vec(),
            })
            .collect()
    }

    /// Export file, line and signature of every frame
    pub fn to_json(&self, normalizer: &SymbolNormalizer<'_>) -> Vec<FrameDigest> {
        self.frames
            .iter()
            .map(|frame| FrameDigest {
                file: normalizer.normalize_path(frame.origin_file()),
                line: frame.origin_line(),
                signature: normalizer.build_signature(frame, ArgStyle::Count, true),
            })
            .collect()
    }

    /// Numbered listing with argument counts
    pub fn render(&self, normalizer: &SymbolNormalizer<'_>) -> String {
        self.render_with(normalizer, ArgStyle::Count)
    }

    /// Numbered listing with every argument rendered
    pub fn render_verbose(&self, normalizer: &SymbolNormalizer<'_>) -> String {
        self.render_with(normalizer, ArgStyle::Full)
    }

    // Innermost frame gets the highest number
    fn render_with(&self, normalizer: &SymbolNormalizer<'_>, args: ArgStyle) -> String {
        let count = self.frames.len();
        let pad = count.to_string().len();
        let mut output = String::new();

        for (i, frame) in self.frames.iter().enumerate() {
            output.push_str(&format!(
                "{:>pad$}: {}\n{:indent$}{}\n",
                count - i,
                normalizer.build_signature(frame, args, true),
                "",
                normalizer.render_location(frame.calling_file(), frame.calling_line()),
                pad = pad,
                indent = pad + 1,
            ));
        }

        output
    }
}

impl Index<usize> for Trace {
    type Output = FrameRecord;

    fn index(&self, index: usize) -> &Self::Output {
        &self.frames[index]
    }
}

impl<'a> IntoIterator for &'a Trace {
    type Item = &'a FrameRecord;
    type IntoIter = std::slice::Iter<'a, FrameRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter()
    }
}

impl IntoIterator for Trace {
    type Item = FrameRecord;
    type IntoIter = std::vec::IntoIter<FrameRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.into_iter()
    }
}

impl fmt::Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(&SymbolNormalizer::plain()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::PathAliasRegistry;
    use crate::stack::builder::TraceBuilder;
    use crate::stack::raw::RawFrame;
    use pretty_assertions::assert_eq;

    fn sample() -> Trace {
        TraceBuilder::new()
            .from_raw(
                vec![
                    RawFrame::method("App\\Service", "->", "run")
                        .at("/var/www/app/src/Kernel.php", 12)
                        .with_args(["job"]),
                    RawFrame::function("main").at("/var/www/app/index.php", 4),
                ],
                0,
            )
            .unwrap()
    }

    #[test]
    fn test_access() {
        let trace = sample();

        assert_eq!(trace.count(), 2);
        assert_eq!(trace.get(1).and_then(|f| f.function()), Some("main"));
        assert!(trace.get(2).is_none());
        assert_eq!(trace.file(), Some("/var/www/app/src/Kernel.php"));
        assert_eq!(trace.line(), Some(12));

        let names: Vec<_> = trace.iter().filter_map(|f| f.function()).collect();
        assert_eq!(names, vec!["run", "main"]);
    }

    #[test]
    fn test_mutation_rejected() {
        let trace = sample();
        let before = trace.clone();

        assert_eq!(
            trace.set(0, trace[1].clone()),
            Err(TraceError::ImmutableCollection)
        );
        assert_eq!(trace.remove(1), Err(TraceError::ImmutableCollection));
        assert_eq!(trace, before);
    }

    #[test]
    fn test_render() {
        let registry = PathAliasRegistry::new();
        registry.register_alias("app", "/var/www/app");
        let normalizer = SymbolNormalizer::new(&registry);

        assert_eq!(
            sample().render(&normalizer),
            "2: App\\Service->run(1)\n  app://src/Kernel.php : 12\n\
             1: main()\n  app://index.php : 4\n"
        );
        assert_eq!(
            sample().render_verbose(&normalizer).lines().next(),
            Some("2: App\\Service->run('job')")
        );
    }

    #[test]
    fn test_exports() {
        let registry = PathAliasRegistry::new();
        registry.register_alias("app", "/var/www/app");
        let normalizer = SymbolNormalizer::new(&registry);
        let trace = sample();

        let details = trace.to_array(&normalizer);
        assert_eq!(details[0].file.as_deref(), Some("app://src/Kernel.php"));
        assert_eq!(details[0].class.as_deref(), Some("Service"));
        assert_eq!(details[0].namespace.as_deref(), Some("App"));
        assert_eq!(details[0].invocation_kind, InvocationKind::InstanceMethod);

        let digest = serde_json::to_value(trace.to_json(&normalizer)).unwrap();
        assert_eq!(
            digest,
            serde_json::json!([
                {"file": "app://src/Kernel.php", "line": 12, "signature": "App\\Service->run(1)"},
                {"file": "app://src/Kernel.php", "line": 12, "signature": "main()"}
            ])
        );
    }
}
