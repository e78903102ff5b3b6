use trace_lens::stack::{stack_trace, FrameRecord, TraceBuilder};
use trace_lens::utils::TraceError;

#[test]
fn test_live_capture() {
    let trace = stack_trace(0).unwrap();

    assert!(!trace.is_empty());
    for i in 1..trace.len() {
        assert_eq!(trace[i].origin(), trace[i - 1].calling());
    }

    // Capture machinery never shows up in the frames
    assert!(trace
        .iter()
        .filter_map(|frame| frame.namespace())
        .all(|ns| !ns.starts_with("backtrace")));
}

#[test]
fn test_live_capture_rewind_out_of_range() {
    assert!(matches!(
        TraceBuilder::new().capture(100_000),
        Err(TraceError::StackRewindOutOfRange {
            requested: 100_000,
            ..
        })
    ));
}

#[test]
fn test_capture_huge_skip_is_an_error() {
    assert!(matches!(
        FrameRecord::capture(usize::MAX),
        Err(TraceError::StackRewindOutOfRange {
            requested: usize::MAX,
            ..
        })
    ));
}

#[test]
fn test_capture_single_frame() {
    let frame = FrameRecord::capture(0).unwrap();
    assert_eq!(frame.function(), Some("test_capture_single_frame"));
    assert!(frame.to_string().contains("test_capture_single_frame()"));
}
