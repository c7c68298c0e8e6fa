//! Validated execution snapshots
//!
//! - [`TraceStep`]: one self-contained snapshot of program state
//! - [`Bindings`]: ordered variable table with unique names
//! - [`NamedArray`]: an array rendered as display strings
//!
//! Values are already rendered to strings by the time they reach this module;
//! nothing here interprets them.

use rustc_hash::FxHashMap;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Variable table for a single step
///
/// Names are unique. Iteration follows first-insertion order; re-inserting an
/// existing name replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings {
    entries: Vec<(String, String)>,
    positions: FxHashMap<String, usize>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a binding, keeping the original position on replace
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(&pos) = self.positions.get(&name) {
            self.entries[pos].1 = value;
            return;
        }
        self.positions.insert(name.clone(), self.entries.len());
        self.entries.push((name, value));
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.positions
            .get(name)
            .map(|&pos| self.entries[pos].1.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(name, value)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for Bindings {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut bindings = Bindings::new();
        for (name, value) in iter {
            bindings.insert(name, value);
        }
        bindings
    }
}

impl Serialize for Bindings {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// An array captured in a step, elements rendered for display
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct NamedArray {
    pub name: String,
    pub values: Vec<String>,
}

impl NamedArray {
    pub fn new(name: impl Into<String>, values: Vec<String>) -> Self {
        NamedArray {
            name: name.into(),
            values,
        }
    }

    /// Placeholder used when a step carries no arrays at all
    pub fn unnamed() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// One execution snapshot
///
/// A step is the complete state at that point: the scene for step N never
/// looks at step N-1.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceStep {
    /// 1-based, strictly increasing within a trace
    pub step_number: u32,
    /// 1-based source line; `None` means "no highlight"
    pub source_line: Option<u32>,
    pub description: String,
    pub variables: Bindings,
    pub arrays: Vec<NamedArray>,
    /// Function names, innermost last
    pub call_stack: Vec<String>,
    /// Program stdout up to and including this step
    pub output: Option<String>,
}

impl TraceStep {
    /// Line 0 is not a source line and becomes `None`
    pub fn new(step_number: u32, source_line: Option<u32>) -> Self {
        TraceStep {
            step_number,
            source_line: source_line.filter(|&line| line > 0),
            description: String::new(),
            variables: Bindings::new(),
            arrays: Vec::new(),
            call_stack: Vec::new(),
            output: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(name, value);
        self
    }

    pub fn with_array<V: Into<String>>(
        mut self,
        name: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.arrays.push(NamedArray::new(
            name,
            values.into_iter().map(Into::into).collect(),
        ));
        self
    }

    pub fn with_call_stack<F: Into<String>>(mut self, frames: impl IntoIterator<Item = F>) -> Self {
        self.call_stack = frames.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = Some(output.into());
        self
    }

    /// Look up an array by name
    pub fn array(&self, name: &str) -> Option<&NamedArray> {
        self.arrays.iter().find(|a| a.name == name)
    }

    /// Innermost function on the call stack
    pub fn current_function(&self) -> Option<&str> {
        self.call_stack.last().map(String::as_str)
    }
}
