// Copyright 2025 Cowboy AI, LLC.

//! Error types for the transformations shipped with this crate
//!
//! [`Pipe`](crate::Pipe) itself has no error type: whatever a wrapped
//! transformation returns (or panics with) reaches the caller unchanged.

use thiserror::Error;

/// Errors raised by the bundled date transformations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    /// Input could not be parsed
    #[error("Failed to parse {input:?}: {reason}")]
    Parse {
        /// The rejected input
        input: String,
        /// Why it was rejected
        reason: String,
    },

    /// Epoch milliseconds outside the representable date range
    #[error("Timestamp out of range: {0} ms")]
    TimestampOutOfRange(i64),

    /// ISO string did not split into a date and a time part
    #[error("Malformed ISO timestamp: {0}")]
    MalformedIso(String),

    /// Serialization error
    ///
    /// Not produced by the bundled date steps; callers chaining their own
    /// serializers reach it through `From<serde_json::Error>`.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for transformations
pub type TransformResult<T> = Result<T, TransformError>;

impl From<serde_json::Error> for TransformError {
    fn from(err: serde_json::Error) -> Self {
        TransformError::Serialization(err.to_string())
    }
}

impl TransformError {
    /// Create a parse error for the given input
    pub fn parse(input: impl Into<String>, reason: impl Into<String>) -> Self {
        TransformError::Parse {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Check if this is a parse error
    pub fn is_parse_error(&self) -> bool {
        matches!(self, TransformError::Parse { .. })
    }
}
