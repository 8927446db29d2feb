//! Error types for ID parsing and validation.

use thiserror::Error;

/// Errors that can occur when parsing or validating IDs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdError {
    /// The ID string is empty.
    #[error("ID cannot be empty")]
    Empty,

    /// The tagged ID does not have three dash-separated segments.
    #[error("tagged ID '{0}' must have the form prefix-kind-number")]
    MissingSegments(String),

    /// The tagged ID has an invalid prefix.
    #[error("invalid tagged ID prefix: expected '{expected}', got '{actual}'")]
    InvalidPrefix {
        expected: &'static str,
        actual: String,
    },

    /// The kind segment of a tagged ID is empty.
    #[error("tagged ID '{0}' has an empty kind segment")]
    EmptyKind(String),

    /// The numeric portion of the ID is not an integer.
    #[error("invalid numeric ID '{input}': {reason}")]
    InvalidNumber { input: String, reason: String },
}

impl IdError {
    /// Returns true if this error indicates the input was empty.
    pub fn is_empty(&self) -> bool {
        matches!(self, IdError::Empty)
    }

    /// Returns true if this error indicates a prefix mismatch.
    pub fn is_prefix_error(&self) -> bool {
        matches!(self, IdError::InvalidPrefix { .. })
    }

    pub(crate) fn invalid_number(input: &str, err: std::num::ParseIntError) -> Self {
        IdError::InvalidNumber {
            input: input.to_string(),
            reason: err.to_string(),
        }
    }
}
