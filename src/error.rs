//! The one error type every registration and mapping pass reports.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MapError {
    /// Registration-time mistake: duplicate key, incompatible option, bad bounds.
    #[error("bad configuration for '{field}': {message}")]
    Config { field: String, message: String },

    #[error("missing required field '{field}'")]
    MissingField { field: String },

    #[error("type mismatch for '{field}': expected {expected}, found {found}")]
    TypeMismatch {
        field: String,
        expected: String,
        found: String,
    },

    /// A present value failed an attached option.
    #[error("value {value} for '{field}' {reason}")]
    Validation {
        field: String,
        value: String,
        reason: String,
    },

    #[error("invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to read JSON source: {0}")]
    Io(#[from] std::io::Error),
}

impl MapError {
    pub fn config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Config { field: field.into(), message: message.into() }
    }

    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingField { field: field.into() }
    }

    pub fn mismatch(field: impl Into<String>, expected: impl ToString, found: impl ToString) -> Self {
        Self::TypeMismatch {
            field: field.into(),
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    pub fn validation(field: impl Into<String>, value: impl ToString, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Path of the offending field, when the error is tied to one.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Config { field, .. }
            | Self::MissingField { field }
            | Self::TypeMismatch { field, .. }
            | Self::Validation { field, .. } => Some(field),
            Self::Parse(_) | Self::Io(_) => None,
        }
    }

    pub fn is_config(&self) -> bool { matches!(self, Self::Config { .. }) }
    pub fn is_missing_field(&self) -> bool { matches!(self, Self::MissingField { .. }) }
    pub fn is_type_mismatch(&self) -> bool { matches!(self, Self::TypeMismatch { .. }) }
    pub fn is_validation(&self) -> bool { matches!(self, Self::Validation { .. }) }
}
