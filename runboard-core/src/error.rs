//! Error types for runboard operations

use thiserror::Error;

/// Validation errors raised while building columns, table state or requests.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Invalid column id {id:?}: {reason}")]
    InvalidColumnId { id: String, reason: String },
}

impl ValidationError {
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_column_id(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidColumnId {
            id: id.into(),
            reason: reason.into(),
        }
    }
}

/// Errors reported by a [`crate::RunService`] implementation.
///
/// Transport details are flattened to strings so the controller and the
/// mocks do not depend on any particular HTTP stack.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ServiceError {
    #[error("Transport failure: {reason}")]
    Transport { reason: String },

    #[error("Service rejected request ({status}) {code}: {message}")]
    Rejected {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Malformed response: {reason}")]
    MalformedResponse { reason: String },
}

impl ServiceError {
    pub fn transport(reason: impl Into<String>) -> Self {
        Self::Transport {
            reason: reason.into(),
        }
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            reason: reason.into(),
        }
    }
}
