//! Build traces from raw stack entries.
//!
//! Raw entries pair each function with the call site that invoked it.
//! A frame needs both that call site and the location currently executing
//! inside the function, which is the call site recorded by the entry
//! above it. The builder walks the entries innermost first, carrying that
//! location down:
//!
//! ```text
//! raw[0]  fn=a  at=L0      ->  frame a: origin=seed  calling=L0
//! raw[1]  fn=b  at=L1      ->  frame b: origin=L0    calling=L1
//! raw[2]  fn=c  at=L2      ->  frame c: origin=L1    calling=L2
//! ```
//!
//! Proxy trampoline entries are removed before this walk so the frames on
//! either side of them pair up directly.

use super::frame::FrameRecord;
use super::raw::{ArgValue, Location, RawFrame};
use super::source::{NativeStackSource, StackSource};
use super::thrown::ThrownError;
use super::trace::Trace;
use crate::path::to_slashes;
use crate::utils::config::{CONSTRUCTOR_MARKER, DEFAULT_PROXY_MARKER};
use crate::utils::error::TraceError;
use log::debug;
use std::sync::Arc;

/// Turns raw stack data into immutable [`Trace`]s
pub struct TraceBuilder {
    proxy_marker: String,
    source: Box<dyn StackSource>,
}

impl Default for TraceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TraceBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TraceBuilder")
            .field("proxy_marker", &self.proxy_marker)
            .finish_non_exhaustive()
    }
}

impl TraceBuilder {
    /// Builder capturing the native stack, filtering the default proxy marker
    pub fn new() -> Self {
        Self {
            proxy_marker: DEFAULT_PROXY_MARKER.to_string(),
            source: Box::new(NativeStackSource),
        }
    }

    /// Drop entries whose file ends with `marker`
    pub fn proxy_marker(mut self, marker: impl Into<String>) -> Self {
        self.proxy_marker = marker.into();
        self
    }

    /// Take live captures from `source`
    pub fn source(mut self, source: impl StackSource + 'static) -> Self {
        self.source = Box::new(source);
        self
    }

    /// Capture the current stack, skipping `skip` innermost entries
    pub fn capture(&self, skip: usize) -> Result<Trace, TraceError> {
        let raw = self.source.raw_frames();
        self.from_raw(raw, skip)
    }

    /// Build from already obtained raw entries
    pub fn from_raw(&self, raw: Vec<RawFrame>, skip: usize) -> Result<Trace, TraceError> {
        self.assemble(raw, skip, None).map(Trace::new)
    }

    /// Validate a JSON stack dump and build from it
    pub fn from_json(&self, dump: &serde_json::Value, skip: usize) -> Result<Trace, TraceError> {
        let raw = RawFrame::from_json_array(dump)?;
        self.from_raw(raw, skip)
    }

    /// Trace for a thrown error
    ///
    /// Errors carrying a prepared trace get it back as is. Otherwise the
    /// error's own stack is built and a frame for the error's construction
    /// is put in front of it.
    pub fn from_error(
        &self,
        error: &dyn ThrownError,
        skip: usize,
    ) -> Result<Arc<Trace>, TraceError> {
        if let Some(trace) = error.prepared_trace() {
            debug!("Using prepared trace of {}", error.type_name());
            return Ok(trace);
        }

        let thrown_at = Location {
            file: error.file().map(str::to_string),
            line: error.line(),
        };

        let mut frames = self.assemble(error.raw_trace().to_vec(), skip, Some(thrown_at.clone()))?;

        let cause = error
            .cause()
            .map_or(ArgValue::Null, |cause| ArgValue::object(cause.type_name()));

        let constructor = RawFrame {
            file: thrown_at.file,
            line: thrown_at.line,
            function: Some(CONSTRUCTOR_MARKER.to_string()),
            class: Some(error.type_name().to_string()),
            operator: Some("->".to_string()),
            args: vec![
                ArgValue::from(error.message()),
                ArgValue::Int(error.code()),
                cause,
            ],
        };

        frames.insert(0, FrameRecord::build(0, constructor, Location::unknown())?);

        Ok(Arc::new(Trace::new(frames)))
    }

    fn is_proxy(&self, frame: &RawFrame) -> bool {
        !self.proxy_marker.is_empty()
            && frame
                .file
                .as_deref()
                .is_some_and(|file| to_slashes(file).ends_with(&self.proxy_marker))
    }

    /// Rewind, filter and re-pair raw entries into frames
    ///
    /// `seed` is the origin of the first frame when nothing is skipped;
    /// without one the first entry's own location is used.
    fn assemble(
        &self,
        raw: Vec<RawFrame>,
        skip: usize,
        seed: Option<Location>,
    ) -> Result<Vec<FrameRecord>, TraceError> {
        let depth = raw.len();

        if skip > 0 && skip >= depth {
            return Err(TraceError::StackRewindOutOfRange {
                requested: skip,
                depth,
            });
        }

        let mut entries = raw.into_iter().enumerate();
        let consumed = entries.by_ref().take(skip).last();
        let retained: Vec<(usize, RawFrame)> = entries.collect();

        let mut origin = match (consumed, seed) {
            (Some((_, last)), _) => last.location(),
            (None, Some(seed)) => seed,
            (None, None) => retained
                .first()
                .map(|(_, first)| first.location())
                .unwrap_or_default(),
        };

        let mut frames = Vec::with_capacity(retained.len());
        let mut filtered = 0;

        for (index, entry) in retained {
            if self.is_proxy(&entry) {
                filtered += 1;
                continue;
            }

            let calling = entry.location();
            frames.push(FrameRecord::build(index, entry, origin)?);
            origin = calling;
        }

        debug!(
            "Built {} frames from {} raw entries ({} skipped, {} proxy)",
            frames.len(),
            depth,
            skip,
            filtered
        );

        Ok(frames)
    }
}
