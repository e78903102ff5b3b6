use std::sync::Arc;
use trace_lens::path::PathAliasRegistry;
use trace_lens::stack::{
    ArgStyle, ArgValue, ErrorReport, Location, RawFrame, SymbolNormalizer, ThrownError, Trace,
    TraceBuilder,
};
use trace_lens::utils::TraceError;

fn raw_stack() -> Vec<RawFrame> {
    vec![
        RawFrame::method("App\\Repo", "->", "find")
            .at("/srv/app/src/Service.php", 41)
            .with_args([7i64]),
        RawFrame::method("App\\Service", "->", "load").at("/srv/app/src/Controller.php", 18),
        RawFrame::function("App\\dispatch").at("/srv/app/public/index.php", 5),
        RawFrame::function("main"),
    ]
}

#[test]
fn test_frames_pair_with_neighbours() {
    let trace = TraceBuilder::new().from_raw(raw_stack(), 0).unwrap();

    assert_eq!(trace.len(), raw_stack().len());
    for i in 1..trace.len() {
        assert_eq!(trace[i].origin(), trace[i - 1].calling());
    }
}

#[test]
fn test_rewind_drops_innermost_entries() {
    let builder = TraceBuilder::new();
    let full = builder.from_raw(raw_stack(), 0).unwrap();

    for skip in 1..full.len() {
        let rewound = builder.from_raw(raw_stack(), skip).unwrap();
        assert_eq!(rewound.len(), full.len() - skip);
        assert_eq!(rewound[0].function(), full[skip].function());
        assert_eq!(rewound[0].origin(), full[skip - 1].calling());
    }

    assert_eq!(
        builder.from_raw(raw_stack(), 10),
        Err(TraceError::StackRewindOutOfRange {
            requested: 10,
            depth: 4
        })
    );
}

#[test]
fn test_rendering_is_stable_under_aliases() {
    let registry = PathAliasRegistry::new();
    registry.register_alias("app", "/srv/app");
    let normalizer = SymbolNormalizer::new(&registry);

    let trace = TraceBuilder::new().from_raw(raw_stack(), 0).unwrap();
    let rendered = trace.render(&normalizer);

    assert!(!rendered.contains("/srv/app"));
    assert!(rendered.starts_with("4: App\\Repo->find(1)\n  app://src/Service.php : 41\n"));
    assert!(rendered.ends_with("1: main()\n  [internal] : ?\n"));

    let digest = trace.to_json(&normalizer);
    assert_eq!(digest[0].file.as_deref(), Some("app://src/Service.php"));
    assert_eq!(digest[2].signature, "App\\dispatch()");
}

#[test]
fn test_error_report_gets_constructor_frame() {
    let report = ErrorReport {
        type_name: "App\\Errors\\NotFound".to_string(),
        message: "record 7 is missing".to_string(),
        code: 404,
        file: Some("/srv/app/src/Repo.php".to_string()),
        line: Some(92),
        previous: Some(Box::new(ErrorReport {
            type_name: "PDOException".to_string(),
            message: String::new(),
            code: 0,
            file: None,
            line: None,
            previous: None,
            trace: Vec::new(),
        })),
        trace: raw_stack(),
    };

    let trace = TraceBuilder::new().from_error(&report, 0).unwrap();
    assert_eq!(trace.len(), 5);

    let constructor = &trace[0];
    assert_eq!(constructor.function(), Some("__construct"));
    assert_eq!(constructor.class().as_deref(), Some("App\\Errors\\NotFound"));
    assert!(constructor.is_instance_method());
    assert_eq!(constructor.calling(), Location::new("/srv/app/src/Repo.php", 92));
    assert_eq!(constructor.origin(), Location::unknown());
    assert_eq!(
        constructor.arguments(),
        &[
            ArgValue::from("record 7 is missing"),
            ArgValue::Int(404),
            ArgValue::object("PDOException"),
        ]
    );
    assert_eq!(
        constructor.signature(ArgStyle::Full, false),
        "NotFound->__construct('record 7 is miss...', 404, PDOException)"
    );

    // The error location seeds the first real frame
    assert_eq!(trace[1].origin(), Location::new("/srv/app/src/Repo.php", 92));
}

struct Rethrown {
    trace: Arc<Trace>,
}

impl ThrownError for Rethrown {
    fn type_name(&self) -> &str {
        "App\\Rethrown"
    }

    fn message(&self) -> &str {
        "again"
    }

    fn file(&self) -> Option<&str> {
        None
    }

    fn line(&self) -> Option<u32> {
        None
    }

    fn raw_trace(&self) -> &[RawFrame] {
        &[]
    }

    fn prepared_trace(&self) -> Option<Arc<Trace>> {
        Some(Arc::clone(&self.trace))
    }
}

#[test]
fn test_prepared_trace_returned_as_is() {
    let prepared = Arc::new(TraceBuilder::new().from_raw(raw_stack(), 1).unwrap());
    let error = Rethrown {
        trace: Arc::clone(&prepared),
    };

    let trace = TraceBuilder::new().from_error(&error, 0).unwrap();
    assert!(Arc::ptr_eq(&trace, &prepared));
}

#[test]
fn test_error_without_location_or_cause() {
    let report = ErrorReport::from_value(&serde_json::json!({
        "class": "Error",
        "message": "",
        "trace": []
    }))
    .unwrap();

    let trace = TraceBuilder::new().from_error(&report, 0).unwrap();
    assert_eq!(trace.len(), 1);
    assert_eq!(trace[0].arguments()[2], ArgValue::Null);
    assert_eq!(trace[0].to_string(), "Error->__construct(3) [internal] : ?");
}
