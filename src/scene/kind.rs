//! Visualization kinds
//!
//! Each course topic picks one kind. The kind decides which projection branch
//! applies; it is never inferred from the trace.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisualizationKind {
    #[default]
    None,
    Memory,
    Pointer,
    Array,
    Struct,
    Loop,
    Flow,
    Stack,
    Grid,
    File,
    Heap,
    LinkedList,
}

impl VisualizationKind {
    pub const ALL: [VisualizationKind; 12] = [
        VisualizationKind::None,
        VisualizationKind::Memory,
        VisualizationKind::Pointer,
        VisualizationKind::Array,
        VisualizationKind::Struct,
        VisualizationKind::Loop,
        VisualizationKind::Flow,
        VisualizationKind::Stack,
        VisualizationKind::Grid,
        VisualizationKind::File,
        VisualizationKind::Heap,
        VisualizationKind::LinkedList,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            VisualizationKind::None => "none",
            VisualizationKind::Memory => "memory",
            VisualizationKind::Pointer => "pointer",
            VisualizationKind::Array => "array",
            VisualizationKind::Struct => "struct",
            VisualizationKind::Loop => "loop",
            VisualizationKind::Flow => "flow",
            VisualizationKind::Stack => "stack",
            VisualizationKind::Grid => "grid",
            VisualizationKind::File => "file",
            VisualizationKind::Heap => "heap",
            VisualizationKind::LinkedList => "linked_list",
        }
    }

    /// Placeholder shown before any trace is available
    pub fn preview_label(self) -> &'static str {
        match self {
            VisualizationKind::None => "Ready to Visualize",
            VisualizationKind::Memory => "Memory Visualizer",
            VisualizationKind::Pointer => "Pointer Visualization",
            VisualizationKind::Array => "Array Visualizer",
            VisualizationKind::Struct => "Struct Visualization",
            VisualizationKind::Loop => "Loop Visualization",
            VisualizationKind::Flow => "Execution Flow",
            VisualizationKind::Stack => "Call Stack",
            VisualizationKind::Grid => "Pattern Grid",
            VisualizationKind::File => "File I/O",
            VisualizationKind::Heap => "Heap Memory",
            VisualizationKind::LinkedList => "Linked List",
        }
    }
}

impl fmt::Display for VisualizationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognised kind name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown visualization kind '{0}'")]
pub struct UnknownKind(pub String);

impl FromStr for VisualizationKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        VisualizationKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip_through_from_str() {
        for kind in VisualizationKind::ALL {
            assert_eq!(kind.as_str().parse::<VisualizationKind>(), Ok(kind));
        }
    }

    #[test]
    fn test_from_str_is_lenient_on_case_and_dashes() {
        assert_eq!(
            "Linked-List".parse::<VisualizationKind>(),
            Ok(VisualizationKind::LinkedList)
        );
        assert!("tree".parse::<VisualizationKind>().is_err());
    }

    #[test]
    fn test_serde_names_match_as_str() {
        let json = serde_json::to_string(&VisualizationKind::LinkedList).unwrap();
        assert_eq!(json, "\"linked_list\"");
    }
}
