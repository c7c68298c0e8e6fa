//! Error types for trace ingestion
//!
//! This module defines [`TraceError`], the only failure the playback core
//! surfaces to its host. Everything else (out-of-range seeks, missing optional
//! fields, empty collections) is absorbed with a defined fallback.

use thiserror::Error;

/// Errors raised while ingesting a generation-service result
#[derive(Debug, Error)]
pub enum TraceError {
    /// The result document is not JSON or lacks the top-level shape
    #[error("Could not parse compilation result: {0}")]
    Json(#[from] serde_json::Error),

    /// A step failed shape validation; the whole trace is rejected
    #[error("Malformed trace step at position {}: {reason}", index + 1)]
    MalformedTraceStep { index: usize, reason: String },
}

impl TraceError {
    pub(crate) fn malformed(index: usize, reason: impl Into<String>) -> Self {
        TraceError::MalformedTraceStep {
            index,
            reason: reason.into(),
        }
    }

    /// Position (0-based) of the offending step, if the error is step-specific
    pub fn step_index(&self) -> Option<usize> {
        match self {
            TraceError::MalformedTraceStep { index, .. } => Some(*index),
            TraceError::Json(_) => None,
        }
    }
}
