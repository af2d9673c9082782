//! Event parsing errors.

use thiserror::Error;

/// Event parsing and validation failures.
///
/// [`EventError::InvalidBatch`] rejects a whole request body. All other
/// variants are local to one element of the batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    /// Request body is not a JSON array
    #[error("Request body is not a JSON array: {0}")]
    InvalidBatch(String),

    /// Element is not valid JSON
    #[error("Invalid event JSON: {0}")]
    Json(String),

    /// Element is not a JSON object
    #[error("Event is not a JSON object")]
    NotAnObject,

    /// Required field absent
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Field present with an invalid value
    #[error("Invalid field {field}: {reason}")]
    InvalidField {
        /// Field name
        field: &'static str,
        /// What was wrong
        reason: String,
    },
}

impl EventError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}
