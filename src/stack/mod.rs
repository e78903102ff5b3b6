//! Stack capture and normalization.
//!
//! This module handles:
//! - Obtaining raw stack entries (live or from dumps)
//! - Rewinding, proxy filtering and re-pairing into frames
//! - Normalizing symbol names for display
//! - The immutable [`Trace`] container and its exports

pub mod builder;
pub mod frame;
pub mod raw;
pub mod source;
pub mod symbol;
pub mod thrown;
pub mod trace;

// Re-export main types
pub use builder::TraceBuilder;
pub use frame::{ArgStyle, FrameRecord, InvocationKind, Separator};
pub use raw::{ArgValue, Location, ObjectRef, RawFrame};
pub use source::{FixedStackSource, NativeStackSource, StackSource};
pub use symbol::{BindingCatalog, DisplayAlias, SymbolNormalizer};
pub use thrown::{ErrorReport, ThrownError};
pub use trace::{FrameDetails, FrameDigest, Trace};

use crate::utils::error::TraceError;

/// Capture the current stack, skipping `skip` innermost frames
pub fn stack_trace(skip: usize) -> Result<Trace, TraceError> {
    TraceBuilder::new().capture(skip)
}
