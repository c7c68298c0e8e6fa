// Integration tests for scene projection

use rstest::rstest;
use tracetty::scene::{project, LoopCounter, Scene, SceneBody, SceneProjector, VisualizationKind};
use tracetty::trace::{NamedArray, TraceStep};

fn sample_step() -> TraceStep {
    TraceStep::new(3, Some(8))
        .with_description("Compare arr[1] with key")
        .with_variable("i", "1")
        .with_variable("key", "4")
        .with_array("arr", ["5", "3", "10"])
        .with_array("tmp", ["0", "0"])
        .with_call_stack(["main", "search"])
        .with_output("Found 3\n")
}

fn body(scene: &Scene) -> &SceneBody {
    &scene.as_live().expect("live scene").body
}

#[rstest]
#[case(VisualizationKind::None)]
#[case(VisualizationKind::Memory)]
#[case(VisualizationKind::Pointer)]
#[case(VisualizationKind::Array)]
#[case(VisualizationKind::Struct)]
#[case(VisualizationKind::Loop)]
#[case(VisualizationKind::Flow)]
#[case(VisualizationKind::Stack)]
#[case(VisualizationKind::Grid)]
#[case(VisualizationKind::File)]
#[case(VisualizationKind::Heap)]
#[case(VisualizationKind::LinkedList)]
fn test_no_step_gives_static_preview(#[case] kind: VisualizationKind) {
    let scene = project(kind, None);
    assert_eq!(scene, Scene::StaticPreview { kind });
    assert!(!scene.is_live());
    assert!(!kind.preview_label().is_empty());
}

#[rstest]
#[case(VisualizationKind::Array)]
#[case(VisualizationKind::Grid)]
fn test_array_kinds_use_first_array(#[case] kind: VisualizationKind) {
    let step = sample_step();
    let scene = project(kind, Some(&step));
    assert_eq!(
        body(&scene),
        &SceneBody::Array {
            primary: NamedArray::new("arr", vec!["5".into(), "3".into(), "10".into()]),
        }
    );
}

#[test]
fn test_array_kind_without_arrays_gets_empty_primary() {
    let step = TraceStep::new(1, Some(2));
    let scene = project(VisualizationKind::Array, Some(&step));
    match body(&scene) {
        SceneBody::Array { primary } => assert!(primary.is_empty()),
        other => panic!("unexpected body {:?}", other),
    }
}

#[test]
fn test_stack_kind_keeps_frame_order() {
    let step = sample_step();
    let scene = project(VisualizationKind::Stack, Some(&step));
    assert_eq!(
        body(&scene),
        &SceneBody::Stack {
            call_stack: vec!["main".to_string(), "search".to_string()],
        }
    );
}

#[test]
fn test_loop_counter_prefers_j_over_count() {
    let step = TraceStep::new(2, Some(5))
        .with_variable("count", "3")
        .with_variable("j", "7");
    let scene = project(VisualizationKind::Loop, Some(&step));
    match body(&scene) {
        SceneBody::Loop { counter } => {
            assert_eq!(counter.value(), Some("7"));
            assert_eq!(
                counter,
                &LoopCounter::Known {
                    variable: "j".to_string(),
                    value: "7".to_string(),
                }
            );
        }
        other => panic!("unexpected body {:?}", other),
    }
}

#[test]
fn test_loop_counter_unknown_without_candidates() {
    let step = TraceStep::new(1, None).with_variable("n", "5");
    let scene = project(VisualizationKind::Loop, Some(&step));
    assert_eq!(
        body(&scene),
        &SceneBody::Loop {
            counter: LoopCounter::Unknown
        }
    );
}

#[rstest]
#[case(VisualizationKind::None)]
#[case(VisualizationKind::Memory)]
#[case(VisualizationKind::Pointer)]
#[case(VisualizationKind::Struct)]
#[case(VisualizationKind::Flow)]
#[case(VisualizationKind::File)]
#[case(VisualizationKind::Heap)]
#[case(VisualizationKind::LinkedList)]
fn test_generic_kinds_keep_every_array(#[case] kind: VisualizationKind) {
    let step = sample_step();
    let scene = project(kind, Some(&step));
    match body(&scene) {
        SceneBody::Generic { arrays } => {
            let names: Vec<&str> = arrays.iter().map(|a| a.name.as_str()).collect();
            assert_eq!(names, vec!["arr", "tmp"]);
        }
        other => panic!("unexpected body {:?}", other),
    }
}

#[test]
fn test_live_scene_carries_step_data() {
    let step = sample_step();
    let scene = project(VisualizationKind::Memory, Some(&step));
    let live = scene.as_live().expect("live scene");

    assert_eq!(live.kind, VisualizationKind::Memory);
    assert_eq!(live.step_number, 3);
    assert_eq!(live.source_line, Some(8));
    assert_eq!(live.description, "Compare arr[1] with key");
    assert_eq!(live.output.as_deref(), Some("Found 3\n"));
    let vars: Vec<(&str, &str)> = live.variables.iter().collect();
    assert_eq!(vars, vec![("i", "1"), ("key", "4")]);
}

#[test]
fn test_projection_is_pure() {
    let step = sample_step();
    let projector = SceneProjector::new(VisualizationKind::Loop);

    let first = projector.project(Some(&step));
    let second = projector.project(Some(&step));
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).expect("serialize"),
        serde_json::to_string(&second).expect("serialize")
    );
    // The step itself is untouched
    assert_eq!(step, sample_step());
}

#[test]
fn test_kind_parsing() {
    assert_eq!(
        "linked-list".parse::<VisualizationKind>().expect("kind"),
        VisualizationKind::LinkedList
    );
    assert_eq!(
        " STACK ".parse::<VisualizationKind>().expect("kind"),
        VisualizationKind::Stack
    );
    assert!("tree".parse::<VisualizationKind>().is_err());
}
