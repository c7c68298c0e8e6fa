//! Wire format of the generation service and its validation
//!
//! The service answers with a JSON [`CompilationResult`]. Its trace steps are
//! loosely typed: `variables` and `arrays` arrive either as lists of
//! `{name, value}` / `{name, values}` objects or as plain JSON objects, and
//! values may be strings, numbers or booleans. [`RawTraceStep`] keeps every
//! field as untyped JSON so that shape problems surface as
//! [`TraceError::MalformedTraceStep`] with a position, not as an opaque
//! deserialization failure.
//!
//! Validation happens exactly once, in [`RawTraceStep::validate`]; the rest of
//! the crate only ever sees [`TraceStep`].

use super::errors::TraceError;
use super::step::{Bindings, NamedArray, TraceStep};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Result of one simulated compile-and-run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilationResult {
    /// Program stdout, or the error text when `success` is false
    pub output: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visualization_trace: Option<Vec<RawTraceStep>>,
}

impl CompilationResult {
    /// Parse a result document
    pub fn from_json(text: &str) -> Result<Self, TraceError> {
        Ok(serde_json::from_str(text)?)
    }

    /// The well-formed result a host substitutes when the service call fails
    pub fn failure(reason: impl AsRef<str>) -> Self {
        CompilationResult {
            output: format!(
                "Error: Could not connect to the compiler service. {}",
                reason.as_ref()
            )
            .trim_end()
            .to_string(),
            success: false,
            analysis: Some("Network or API error occurred.".to_string()),
            visualization_trace: None,
        }
    }

    /// Number of raw steps, before validation
    pub fn step_count(&self) -> usize {
        self.visualization_trace.as_ref().map_or(0, Vec::len)
    }

    /// Hand the raw steps to a player; an absent trace is an empty one
    pub fn into_trace_steps(self) -> Vec<RawTraceStep> {
        self.visualization_trace.unwrap_or_default()
    }
}

/// A trace step exactly as received.
///
/// Any JSON value deserializes; an entry that is not a mapping is kept as a
/// shape error and only fails at [`RawTraceStep::validate`], so one bad entry
/// never loses the rest of the result document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct RawTraceStep {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrays: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    /// JSON type of an entry that was not a mapping
    #[serde(skip)]
    pub not_a_mapping: Option<&'static str>,
}

impl From<Value> for RawTraceStep {
    fn from(value: Value) -> Self {
        let mut map = match value {
            Value::Object(map) => map,
            other => {
                return RawTraceStep {
                    not_a_mapping: Some(json_kind(&other)),
                    ..RawTraceStep::default()
                }
            }
        };
        RawTraceStep {
            step: take_field(&mut map, &["step", "stepNumber"]),
            line: take_field(&mut map, &["line", "sourceLine"]),
            description: take_field(&mut map, &["description"]),
            variables: take_field(&mut map, &["variables"]),
            arrays: take_field(&mut map, &["arrays"]),
            stack: take_field(&mut map, &["stack", "callStack"]),
            output: take_field(&mut map, &["output"]),
            not_a_mapping: None,
        }
    }
}

/// First present spelling of a field; an explicit null counts as absent
fn take_field(map: &mut Map<String, Value>, keys: &[&str]) -> Option<Value> {
    keys.iter()
        .filter_map(|key| map.remove(*key))
        .find(|value| !value.is_null())
}

impl RawTraceStep {
    /// Check the minimal shape of a step and convert it.
    ///
    /// `index` is the step's position in the trace and is only used for error
    /// reporting.
    pub fn validate(&self, index: usize) -> Result<TraceStep, TraceError> {
        if let Some(kind) = self.not_a_mapping {
            return Err(TraceError::malformed(
                index,
                format!("step must be a mapping, got {}", kind),
            ));
        }
        let step_number = parse_step_number(self.step.as_ref())
            .map_err(|reason| TraceError::malformed(index, reason))?;

        let mut step = TraceStep::new(step_number, parse_line(self.line.as_ref()));
        step.description = self
            .description
            .as_ref()
            .map(render_value)
            .unwrap_or_default();
        step.variables = parse_variables(self.variables.as_ref())
            .map_err(|reason| TraceError::malformed(index, reason))?;
        step.arrays = parse_arrays(self.arrays.as_ref())
            .map_err(|reason| TraceError::malformed(index, reason))?;
        step.call_stack = parse_call_stack(self.stack.as_ref())
            .map_err(|reason| TraceError::malformed(index, reason))?;
        step.output = self.output.as_ref().map(render_value);

        Ok(step)
    }
}

/// Render a JSON value the way the course UI displays it
pub(crate) fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Whole, positive number that fits in a u32 (`3` and `3.0` both qualify)
fn as_positive_u32(value: &Value) -> Option<u32> {
    let n = match value {
        Value::Number(n) => n,
        _ => return None,
    };
    if let Some(u) = n.as_u64() {
        return u32::try_from(u).ok().filter(|&u| u > 0);
    }
    let f = n.as_f64()?;
    if f.fract() == 0.0 && f >= 1.0 && f <= u32::MAX as f64 {
        Some(f as u32)
    } else {
        None
    }
}

fn parse_step_number(value: Option<&Value>) -> Result<u32, String> {
    match value {
        None | Some(Value::Null) => Err("missing step number".to_string()),
        Some(v) => as_positive_u32(v)
            .ok_or_else(|| format!("step number {} is not a positive integer", v)),
    }
}

fn parse_line(value: Option<&Value>) -> Option<u32> {
    value.and_then(as_positive_u32)
}

fn parse_variables(value: Option<&Value>) -> Result<Bindings, String> {
    let mut bindings = Bindings::new();
    match value {
        None | Some(Value::Null) => {}
        Some(Value::Array(items)) => {
            for item in items {
                let Some((name, entry)) = named_entry(item) else {
                    continue;
                };
                let value = entry.get("value").map(render_value).unwrap_or_default();
                bindings.insert(name, value);
            }
        }
        Some(Value::Object(map)) => {
            for (name, value) in map {
                bindings.insert(name.as_str(), render_value(value));
            }
        }
        Some(other) => {
            return Err(format!(
                "variables must be a list or a mapping, got {}",
                json_kind(other)
            ));
        }
    }
    Ok(bindings)
}

fn parse_arrays(value: Option<&Value>) -> Result<Vec<NamedArray>, String> {
    let mut arrays: Vec<NamedArray> = Vec::new();
    let mut push = |name: &str, values: Vec<String>| {
        if let Some(existing) = arrays.iter_mut().find(|a| a.name == name) {
            existing.values = values;
        } else {
            arrays.push(NamedArray::new(name, values));
        }
    };

    match value {
        None | Some(Value::Null) => {}
        Some(Value::Array(items)) => {
            for item in items {
                let Some((name, entry)) = named_entry(item) else {
                    continue;
                };
                let values = parse_elements(name, entry.get("values"))?;
                push(name, values);
            }
        }
        Some(Value::Object(map)) => {
            for (name, values) in map {
                let values = parse_elements(name, Some(values))?;
                push(name, values);
            }
        }
        Some(other) => {
            return Err(format!(
                "arrays must be a list or a mapping, got {}",
                json_kind(other)
            ));
        }
    }
    Ok(arrays)
}

fn parse_elements(name: &str, value: Option<&Value>) -> Result<Vec<String>, String> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(elements)) => Ok(elements.iter().map(render_value).collect()),
        Some(other) => Err(format!(
            "values of array '{}' must be a list, got {}",
            name,
            json_kind(other)
        )),
    }
}

fn parse_call_stack(value: Option<&Value>) -> Result<Vec<String>, String> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(frames)) => frames
            .iter()
            .map(|frame| match frame {
                Value::String(name) => Ok(name.clone()),
                other => Err(format!(
                    "call stack entries must be strings, got {}",
                    json_kind(other)
                )),
            })
            .collect(),
        Some(other) => Err(format!(
            "call stack must be a list, got {}",
            json_kind(other)
        )),
    }
}

/// `{ "name": "...", ... }` list entries; entries without a usable name are skipped
fn named_entry(item: &Value) -> Option<(&str, &Map<String, Value>)> {
    let entry = item.as_object()?;
    let name = entry.get("name")?.as_str()?;
    if name.is_empty() {
        return None;
    }
    Some((name, entry))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}
