//! Collaborator failure type.

use thiserror::Error;

/// Errors raised by the record store behind a lookup.
///
/// The core never interprets these; they are surfaced to the caller unchanged.
#[derive(Debug, Error)]
pub enum LookupError {
    /// The backing store could not be reached.
    #[error("Record store unavailable: {0}")]
    Unavailable(String),

    /// The backing store answered with an error.
    #[error("Record store error: {message}")]
    Backend {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl LookupError {
    /// Creates a backend error without an underlying cause.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
            source: None,
        }
    }

    /// Wraps an underlying store error.
    pub fn from_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Backend {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}
