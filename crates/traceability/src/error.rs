//! Trace error types.

use std::time::Duration;

use common::LookupError;
use thiserror::Error;

use crate::subject::SubjectKind;

/// Errors that can occur while reconstructing a trace.
#[derive(Debug, Error)]
pub enum TraceError {
    /// The caller supplied a malformed subject or filter.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The subject itself is unknown to the record store.
    ///
    /// A known subject with no events is not an error.
    #[error("{kind} not found: {subject_id}")]
    NotFound {
        subject_id: String,
        kind: SubjectKind,
    },

    /// The lookups did not finish before the deadline or the caller cancelled.
    #[error("Trace of {subject_id} aborted after {after:?}")]
    Timeout { subject_id: String, after: Duration },

    /// A lookup collaborator failed.
    #[error("Collaborator error: {0}")]
    Collaborator(#[from] LookupError),
}

impl TraceError {
    /// Returns true if repeating the call with the same inputs may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TraceError::Timeout { .. } | TraceError::Collaborator(LookupError::Unavailable(_))
        )
    }
}

/// Result type for trace operations.
pub type Result<T> = std::result::Result<T, TraceError>;
