// Integration tests for ingesting generation-service results

use std::sync::mpsc;

use tracetty::player::{PlaybackStatus, PlayerConfig, TracePlayer};
use tracetty::scene::{project, SceneBody, VisualizationKind};
use tracetty::trace::{CompilationResult, Trace, TraceError};

const LIST_FORM: &str = r#"{
    "output": "Sum: 15\n",
    "success": true,
    "analysis": "Adds the array elements.",
    "visualizationTrace": [
        {
            "step": 1,
            "line": 4,
            "description": "Declare sum",
            "variables": [{"name": "sum", "value": 0}],
            "arrays": [{"name": "arr", "values": [1, 2, 3, 4, 5]}],
            "stack": ["main"]
        },
        {
            "step": 2,
            "line": 6,
            "description": "Loop starts",
            "variables": [{"name": "sum", "value": 0}, {"name": "i", "value": 0}],
            "arrays": [{"name": "arr", "values": [1, 2, 3, 4, 5]}],
            "stack": ["main"]
        }
    ]
}"#;

const OBJECT_FORM: &str = r#"{
    "output": "Sum: 15\n",
    "success": true,
    "visualizationTrace": [
        {
            "stepNumber": 1,
            "sourceLine": 4,
            "description": "Declare sum",
            "variables": {"sum": 0},
            "arrays": {"arr": [1, 2, 3, 4, 5]},
            "callStack": ["main"]
        },
        {
            "stepNumber": 2,
            "sourceLine": 6,
            "description": "Loop starts",
            "variables": {"sum": "0", "i": "0"},
            "arrays": {"arr": ["1", "2", "3", "4", "5"]},
            "callStack": ["main"]
        }
    ]
}"#;

fn trace_of(json: &str) -> Result<Trace, TraceError> {
    let result = CompilationResult::from_json(json)?;
    Trace::from_raw(&result.into_trace_steps())
}

#[test]
fn test_list_and_object_forms_agree() {
    let list = trace_of(LIST_FORM).expect("list form");
    let object = trace_of(OBJECT_FORM).expect("object form");
    assert_eq!(list, object);
    assert_eq!(list.len(), 2);
}

#[test]
fn test_scalars_are_stringified() {
    let trace = trace_of(LIST_FORM).expect("list form");
    let step = trace.get(0).expect("first step");

    assert_eq!(step.variables.get("sum"), Some("0"));
    let arr = step.array("arr").expect("arr");
    assert_eq!(arr.values, vec!["1", "2", "3", "4", "5"]);
    assert_eq!(step.current_function(), Some("main"));
}

#[test]
fn test_missing_optional_fields_use_defaults() {
    let json = r#"{"output": "", "success": true, "visualizationTrace": [{"step": 1}]}"#;
    let trace = trace_of(json).expect("minimal step");
    let step = trace.get(0).expect("step");

    assert_eq!(step.source_line, None);
    assert!(step.description.is_empty());
    assert!(step.variables.is_empty());
    assert!(step.arrays.is_empty());
    assert!(step.call_stack.is_empty());
    assert_eq!(step.output, None);
}

#[test]
fn test_absent_trace_is_empty() {
    let result =
        CompilationResult::from_json(r#"{"output": "error: expected ';'", "success": false}"#)
            .expect("result");
    assert_eq!(result.step_count(), 0);

    let mut player: TracePlayer = TracePlayer::new(PlayerConfig::default());
    player
        .load(&result.into_trace_steps())
        .expect("empty trace loads");
    assert_eq!(player.status(), PlaybackStatus::Empty);
}

#[test]
fn test_malformed_step_rejects_whole_trace() {
    let json = r#"{
        "output": "",
        "success": true,
        "visualizationTrace": [
            {"step": 1, "line": 2},
            {"step": 2, "line": 3, "variables": 42},
            {"step": 3, "line": 4}
        ]
    }"#;
    let result = CompilationResult::from_json(json).expect("result");

    let mut player: TracePlayer = TracePlayer::new(PlayerConfig::default());
    let (tx, rx) = mpsc::channel();
    player.on_line_changed(move |line| {
        let _ = tx.send(line);
    });

    // A good trace first, so rejection has something to replace
    player.load_trace(trace_of(LIST_FORM).expect("list form"));
    assert!(!player.is_empty());

    let err = player
        .load(&result.into_trace_steps())
        .expect_err("malformed trace");
    assert!(matches!(err, TraceError::MalformedTraceStep { .. }));
    assert_eq!(err.step_index(), Some(1));
    assert!(err.to_string().contains("position 2"));

    assert_eq!(player.status(), PlaybackStatus::Empty);
    assert!(player.is_empty());
    assert_eq!(player.pending_tick(), None);
    assert_eq!(rx.try_iter().last(), Some(None));
}

#[test]
fn test_missing_step_number_is_malformed() {
    let json = r#"{"output": "", "success": true, "visualizationTrace": [{"line": 3}]}"#;
    let err = trace_of(json).expect_err("no step number");
    assert_eq!(err.step_index(), Some(0));
}

#[test]
fn test_non_increasing_step_numbers_are_malformed() {
    let json = r#"{
        "output": "",
        "success": true,
        "visualizationTrace": [{"step": 2}, {"step": 2}]
    }"#;
    let err = trace_of(json).expect_err("repeated step number");
    assert_eq!(err.step_index(), Some(1));
}

#[test]
fn test_invalid_json_is_a_parse_error() {
    let err = CompilationResult::from_json("{ not json").expect_err("invalid json");
    assert!(matches!(err, TraceError::Json(_)));
    assert_eq!(err.step_index(), None);
}

#[test]
fn test_failure_result_shape() {
    let result = CompilationResult::failure("timed out");
    assert!(!result.success);
    assert_eq!(
        result.output,
        "Error: Could not connect to the compiler service. timed out"
    );
    assert_eq!(
        result.analysis.as_deref(),
        Some("Network or API error occurred.")
    );
    assert!(result.visualization_trace.is_none());
}

#[test]
fn test_end_to_end_array_replay() {
    let result = CompilationResult::from_json(LIST_FORM).expect("result");
    let mut player: TracePlayer = TracePlayer::new(PlayerConfig::default());

    let (tx, rx) = mpsc::channel();
    player.on_step_changed(move |_, step| {
        let _ = tx.send(project(VisualizationKind::Array, Some(step)));
    });

    player.load(&result.into_trace_steps()).expect("valid trace");
    while player.is_playing() {
        player.advance_by(player.config().cadence);
    }

    let scenes: Vec<_> = rx.try_iter().collect();
    assert_eq!(scenes.len(), 2);
    for scene in &scenes {
        match &scene.as_live().expect("live").body {
            SceneBody::Array { primary } => assert_eq!(primary.name, "arr"),
            other => panic!("unexpected body {:?}", other),
        }
    }
    assert_eq!(player.status(), PlaybackStatus::Finished);
}

#[test]
fn test_line_signal_over_wire_trace() {
    let json = r#"{
        "output": "",
        "success": true,
        "visualizationTrace": [
            {"stepNumber": 1, "sourceLine": 4, "variables": {"i": "0"}},
            {"stepNumber": 2, "sourceLine": 4, "variables": {"i": "1"}},
            {"stepNumber": 3, "sourceLine": 6, "variables": {"i": "2"}}
        ]
    }"#;
    let result = CompilationResult::from_json(json).expect("result");

    let mut player: TracePlayer = TracePlayer::new(PlayerConfig::default());
    let (line_tx, lines) = mpsc::channel();
    player.on_line_changed(move |line| {
        let _ = line_tx.send(line);
    });
    let (done_tx, done) = mpsc::channel();
    player.on_finished(move || {
        let _ = done_tx.send(());
    });

    player.load(&result.into_trace_steps()).expect("valid trace");
    assert_eq!(lines.try_iter().collect::<Vec<_>>(), vec![Some(4)]);

    let cadence = player.config().cadence;
    player.advance_by(cadence);
    player.advance_by(cadence);

    assert_eq!(lines.try_iter().collect::<Vec<_>>(), vec![Some(6)]);
    assert_eq!(done.try_iter().count(), 1);
    assert_eq!(player.current_step().and_then(|s| s.variables.get("i")), Some("2"));
}

#[test]
fn test_loading_no_steps_is_empty() {
    let mut player: TracePlayer = TracePlayer::new(PlayerConfig::default());
    player.load(&[]).expect("empty trace loads");
    assert_eq!(player.status(), PlaybackStatus::Empty);
    assert_eq!(player.current_index(), None);
}

#[test]
fn test_non_mapping_step_keeps_result() {
    let json = r#"{
        "output": "ok",
        "success": true,
        "analysis": "fine",
        "visualizationTrace": [{"step": 1, "line": 2}, "garbage"]
    }"#;
    let result = CompilationResult::from_json(json).expect("document still parses");
    assert_eq!(result.output, "ok");
    assert_eq!(result.analysis.as_deref(), Some("fine"));
    assert_eq!(result.step_count(), 2);

    let mut player: TracePlayer = TracePlayer::new(PlayerConfig::default());
    let err = player
        .load(&result.into_trace_steps())
        .expect_err("non-mapping step");
    assert!(matches!(err, TraceError::MalformedTraceStep { index: 1, .. }));
    assert_eq!(player.status(), PlaybackStatus::Empty);
}
