//! Scene projection
//!
//! A [`Scene`] is what a renderer needs to draw one step for one
//! [`VisualizationKind`], with the per-kind decisions already made:
//!
//! | kind              | body                                  |
//! |-------------------|---------------------------------------|
//! | `array`, `grid`   | first array of the step               |
//! | `stack`           | call stack, innermost last            |
//! | `loop`            | counter taken from `i`, `j`, `count`  |
//! | everything else   | every array, in order                 |
//!
//! All live scenes also carry the step's variables, description and output
//! untouched. Projection is a pure function: the same `(kind, step)` always
//! yields an equal scene, and serializes to the same bytes.

pub mod kind;

pub use kind::{UnknownKind, VisualizationKind};

use crate::trace::{Bindings, NamedArray, TraceStep};
use serde::Serialize;

/// Variable names consulted for the loop counter, highest priority first
pub const LOOP_COUNTER_PRIORITY: [&str; 3] = ["i", "j", "count"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum Scene {
    /// No trace: the renderer shows a fixed placeholder for the kind
    StaticPreview { kind: VisualizationKind },
    Live(LiveScene),
}

impl Scene {
    pub fn kind(&self) -> VisualizationKind {
        match self {
            Scene::StaticPreview { kind } => *kind,
            Scene::Live(live) => live.kind,
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, Scene::Live(_))
    }

    pub fn as_live(&self) -> Option<&LiveScene> {
        match self {
            Scene::Live(live) => Some(live),
            Scene::StaticPreview { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveScene {
    pub kind: VisualizationKind,
    pub step_number: u32,
    pub source_line: Option<u32>,
    pub description: String,
    pub output: Option<String>,
    pub variables: Bindings,
    pub body: SceneBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum SceneBody {
    Array {
        #[serde(rename = "primaryArray")]
        primary: NamedArray,
    },
    Stack {
        #[serde(rename = "callStack")]
        call_stack: Vec<String>,
    },
    Loop {
        #[serde(rename = "loopCounter")]
        counter: LoopCounter,
    },
    Generic {
        arrays: Vec<NamedArray>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LoopCounter {
    Known { variable: String, value: String },
    Unknown,
}

impl LoopCounter {
    pub fn value(&self) -> Option<&str> {
        match self {
            LoopCounter::Known { value, .. } => Some(value),
            LoopCounter::Unknown => None,
        }
    }

    /// Counter text for display; `-` when unknown
    pub fn display(&self) -> &str {
        self.value().unwrap_or("-")
    }
}

/// Projector bound to one topic's visualization kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SceneProjector {
    pub kind: VisualizationKind,
}

impl SceneProjector {
    pub fn new(kind: VisualizationKind) -> Self {
        SceneProjector { kind }
    }

    pub fn project(&self, step: Option<&TraceStep>) -> Scene {
        project(self.kind, step)
    }
}

/// Map a step (or its absence) to the scene for `kind`
pub fn project(kind: VisualizationKind, step: Option<&TraceStep>) -> Scene {
    let Some(step) = step else {
        return Scene::StaticPreview { kind };
    };

    let body = match kind {
        VisualizationKind::Array | VisualizationKind::Grid => SceneBody::Array {
            primary: step.arrays.first().cloned().unwrap_or_else(NamedArray::unnamed),
        },
        VisualizationKind::Stack => SceneBody::Stack {
            call_stack: step.call_stack.clone(),
        },
        VisualizationKind::Loop => SceneBody::Loop {
            counter: loop_counter(&step.variables),
        },
        _ => SceneBody::Generic {
            arrays: step.arrays.clone(),
        },
    };

    Scene::Live(LiveScene {
        kind,
        step_number: step.step_number,
        source_line: step.source_line,
        description: step.description.clone(),
        output: step.output.clone(),
        variables: step.variables.clone(),
        body,
    })
}

/// First of `i`, `j`, `count` present in the step, in exactly that order
pub fn loop_counter(variables: &Bindings) -> LoopCounter {
    LOOP_COUNTER_PRIORITY
        .iter()
        .find_map(|&name| {
            variables.get(name).map(|value| LoopCounter::Known {
                variable: name.to_string(),
                value: value.to_string(),
            })
        })
        .unwrap_or(LoopCounter::Unknown)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loop_counter_priority() {
        let vars: Bindings = [("count", "3"), ("j", "7")].into_iter().collect();
        assert_eq!(loop_counter(&vars).value(), Some("7"));

        let vars: Bindings = [("count", "3"), ("j", "7"), ("i", "1")].into_iter().collect();
        assert_eq!(loop_counter(&vars).value(), Some("1"));

        let vars: Bindings = [("k", "9")].into_iter().collect();
        assert_eq!(loop_counter(&vars), LoopCounter::Unknown);
        assert_eq!(LoopCounter::Unknown.display(), "-");
    }

    #[test]
    fn test_scene_json_tags() {
        let preview = serde_json::to_value(project(VisualizationKind::Heap, None)).unwrap();
        assert_eq!(preview["mode"], "static-preview");
        assert_eq!(preview["kind"], "heap");

        let step = TraceStep::new(1, Some(2)).with_call_stack(["main"]);
        let live = serde_json::to_value(project(VisualizationKind::Stack, Some(&step))).unwrap();
        assert_eq!(live["mode"], "live");
        assert_eq!(live["body"]["view"], "stack");
        assert_eq!(live["body"]["callStack"][0], "main");
    }
}
