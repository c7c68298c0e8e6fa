//! Execution traces
//!
//! A trace is the ordered list of snapshots the generation service fabricates
//! for one run of the learner's program. This module provides:
//! - [`wire`]: the service's JSON result ([`CompilationResult`]) and the raw
//!   step shape ([`RawTraceStep`])
//! - [`step`]: the validated snapshot ([`TraceStep`]) and its parts
//! - [`errors`]: [`TraceError`], raised once, at ingestion
//!
//! # Lifecycle
//!
//! A [`Trace`] is built atomically from the raw steps and never mutated
//! afterwards. Loading a new trace replaces the old one in full; there is no
//! incremental merge.

pub mod errors;
pub mod step;
pub mod wire;

pub use errors::TraceError;
pub use step::{Bindings, NamedArray, TraceStep};
pub use wire::{CompilationResult, RawTraceStep};

/// Longest trace the service has been observed to produce
pub const OBSERVED_STEP_CAP: usize = 20;

/// An ordered, immutable sequence of validated steps
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
#[serde(transparent)]
pub struct Trace {
    steps: Vec<TraceStep>,
}

impl Trace {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a trace from already-typed steps.
    ///
    /// Step numbers must be positive and strictly increasing. A source line
    /// of 0 is cleared to `None`.
    pub fn new(mut steps: Vec<TraceStep>) -> Result<Self, TraceError> {
        let mut previous: Option<u32> = None;
        for (index, step) in steps.iter_mut().enumerate() {
            step.source_line = step.source_line.filter(|&line| line > 0);
            if step.step_number == 0 {
                return Err(TraceError::malformed(
                    index,
                    "step number 0 is not a positive integer",
                ));
            }
            if let Some(prev) = previous {
                if step.step_number <= prev {
                    return Err(TraceError::malformed(
                        index,
                        format!(
                            "step number {} does not follow step {}",
                            step.step_number, prev
                        ),
                    ));
                }
            }
            previous = Some(step.step_number);
        }

        if steps.len() > OBSERVED_STEP_CAP {
            tracing::debug!(
                steps = steps.len(),
                cap = OBSERVED_STEP_CAP,
                "trace longer than the service normally produces"
            );
        }

        Ok(Trace { steps })
    }

    /// Validate raw service steps; any malformed step rejects the whole trace
    pub fn from_raw(raw: &[RawTraceStep]) -> Result<Self, TraceError> {
        let steps = raw
            .iter()
            .enumerate()
            .map(|(index, step)| step.validate(index))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(steps)
    }

    pub fn get(&self, index: usize) -> Option<&TraceStep> {
        self.steps.get(index)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Index of the final step, `None` for an empty trace
    pub fn last_index(&self) -> Option<usize> {
        self.steps.len().checked_sub(1)
    }

    pub fn steps(&self) -> &[TraceStep] {
        &self.steps
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TraceStep> {
        self.steps.iter()
    }
}

impl<'a> IntoIterator for &'a Trace {
    type Item = &'a TraceStep;
    type IntoIter = std::slice::Iter<'a, TraceStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_numbers_must_increase() {
        let err = Trace::new(vec![TraceStep::new(1, None), TraceStep::new(1, None)]).unwrap_err();
        assert_eq!(err.step_index(), Some(1));
    }

    #[test]
    fn test_gaps_in_step_numbers_allowed() {
        let trace = Trace::new(vec![TraceStep::new(1, None), TraceStep::new(5, None)]).unwrap();
        assert_eq!(trace.last_index(), Some(1));
    }

    #[test]
    fn test_line_zero_cleared() {
        let mut step = TraceStep::new(1, Some(3));
        step.source_line = Some(0);
        let trace = Trace::new(vec![step]).unwrap();
        assert_eq!(trace.get(0).and_then(|s| s.source_line), None);
    }

    #[test]
    fn test_empty_trace() {
        let trace = Trace::new(Vec::new()).unwrap();
        assert!(trace.is_empty());
        assert_eq!(trace.last_index(), None);
    }
}
