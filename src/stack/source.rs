//! Where live captures get their raw stack from.
//!
//! [`NativeStackSource`] walks the current thread with the `backtrace`
//! crate and reshapes native frames into call-site entries: entry *i*
//! names the function of native frame *i* and carries the location of
//! native frame *i + 1*, the point it was called from.

use super::raw::RawFrame;
use log::debug;

/// Symbols under this prefix belong to the capture machinery itself
const INTERNAL_PREFIX: &str = concat!(env!("CARGO_CRATE_NAME"), "::stack::");

/// A provider of raw stack entries, innermost first
pub trait StackSource: Send + Sync {
    fn raw_frames(&self) -> Vec<RawFrame>;
}

/// Replays a fixed list of entries on every capture
#[derive(Debug, Clone, Default)]
pub struct FixedStackSource {
    frames: Vec<RawFrame>,
}

impl FixedStackSource {
    pub fn new(frames: Vec<RawFrame>) -> Self {
        Self { frames }
    }
}

impl StackSource for FixedStackSource {
    fn raw_frames(&self) -> Vec<RawFrame> {
        self.frames.clone()
    }
}

/// Captures the current thread's native stack
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeStackSource;

#[derive(Debug, Default)]
struct NativeSymbol {
    name: Option<String>,
    file: Option<String>,
    line: Option<u32>,
}

impl NativeSymbol {
    fn from_symbol(symbol: &backtrace::BacktraceSymbol) -> Self {
        Self {
            // Alternate formatting drops the trailing hash
            name: symbol.name().map(|name| format!("{:#}", name)),
            file: symbol
                .filename()
                .map(|path| path.to_string_lossy().into_owned()),
            line: symbol.lineno(),
        }
    }

    fn bare_name(&self) -> Option<&str> {
        self.name.as_deref().map(|name| name.trim_start_matches('<'))
    }

    /// Unwinder frames and unresolved leading addresses
    fn is_machinery(&self) -> bool {
        match self.bare_name() {
            Some(name) => name.starts_with("backtrace::"),
            None => true,
        }
    }

    fn is_internal(&self) -> bool {
        self.bare_name()
            .is_some_and(|name| name.starts_with(INTERNAL_PREFIX) && !name.contains("::tests::"))
    }
}

impl StackSource for NativeStackSource {
    fn raw_frames(&self) -> Vec<RawFrame> {
        let backtrace = backtrace::Backtrace::new();

        let symbols: Vec<NativeSymbol> = backtrace
            .frames()
            .iter()
            .flat_map(|frame| {
                let symbols = frame.symbols();
                if symbols.is_empty() {
                    vec![NativeSymbol::default()]
                } else {
                    symbols.iter().map(NativeSymbol::from_symbol).collect()
                }
            })
            .collect();

        let start = capture_point(&symbols);
        debug!(
            "Native stack: {} symbols, capture point at {}",
            symbols.len(),
            start
        );

        to_call_sites(&symbols[start..])
    }
}

/// Index of the innermost symbol to keep
///
/// The capture point is the outermost frame of our own machinery so the
/// first entry carries the caller's location.
fn capture_point(symbols: &[NativeSymbol]) -> usize {
    let lead = symbols.iter().take_while(|s| s.is_machinery()).count();
    let internal = symbols[lead..]
        .iter()
        .take_while(|s| s.is_internal())
        .count();

    if internal > 0 {
        lead + internal - 1
    } else {
        lead
    }
}

fn to_call_sites(symbols: &[NativeSymbol]) -> Vec<RawFrame> {
    symbols
        .iter()
        .enumerate()
        .map(|(i, symbol)| {
            let caller = symbols.get(i + 1);
            RawFrame {
                file: caller.and_then(|c| c.file.clone()),
                line: caller.and_then(|c| c.line),
                function: symbol.name.clone(),
                ..RawFrame::default()
            }
        })
        .collect()
}
