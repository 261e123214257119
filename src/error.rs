//! Error types for the daily review pipeline

use thiserror::Error;

/// Errors that can occur while building a daily review
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Invalid observation field `{field}`: {reason}")]
    Validation { field: String, reason: String },

    #[error("Invalid analysis window: {0}")]
    InvalidWindow(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to parse observations: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl ComputeError {
    /// Build a validation error naming the offending field
    pub fn validation(field: &str, reason: impl Into<String>) -> Self {
        ComputeError::Validation {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// Name of the offending field for validation errors
    pub fn field(&self) -> Option<&str> {
        match self {
            ComputeError::Validation { field, .. } => Some(field),
            _ => None,
        }
    }
}
