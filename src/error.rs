//! Configuration errors.
//!
//! Raised only while building a pipeline. Record processing has no error
//! path: a processor that cannot act on a record leaves it unchanged.

use thiserror::Error;

/// Error raised while parsing or compiling processor configuration.
///
/// Every variant that concerns a single processor names its `id` and the
/// offending field.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document does not have the expected shape (unknown action or
    /// processor type, wrong value types, unknown keys).
    #[error("failed to parse processor configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// A single processor entry could not be deserialized.
    #[error("processor '{processor}': {reason}")]
    Malformed { processor: String, reason: String },

    #[error("duplicate processor id '{id}'")]
    DuplicateId { id: String },

    #[error("processor '{processor}': field '{field}' is not allowed: {reason}")]
    IllegalField {
        processor: String,
        field: String,
        reason: String,
    },

    #[error("processor '{processor}': missing required field '{field}'")]
    MissingField { processor: String, field: String },

    #[error("processor '{processor}': invalid pattern in '{field}' ({pattern}): {reason}")]
    InvalidPattern {
        processor: String,
        field: String,
        pattern: String,
        reason: String,
    },

    #[error(
        "processor '{processor}': '{field}' lists groups {expected:?} but pattern declares {found:?}"
    )]
    GroupNameMismatch {
        processor: String,
        field: String,
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("processor '{processor}': invalid value for '{field}': {reason}")]
    InvalidValue {
        processor: String,
        field: String,
        reason: String,
    },
}

impl ConfigError {
    pub fn illegal(processor: &str, field: &str, reason: impl Into<String>) -> Self {
        Self::IllegalField {
            processor: processor.to_string(),
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub fn missing(processor: &str, field: &str) -> Self {
        Self::MissingField {
            processor: processor.to_string(),
            field: field.to_string(),
        }
    }

    pub fn invalid_value(processor: &str, field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            processor: processor.to_string(),
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// Processor id the error refers to, if any.
    pub fn processor_id(&self) -> Option<&str> {
        match self {
            ConfigError::Parse(_) => None,
            ConfigError::DuplicateId { id } => Some(id),
            ConfigError::Malformed { processor, .. }
            | ConfigError::IllegalField { processor, .. }
            | ConfigError::MissingField { processor, .. }
            | ConfigError::InvalidPattern { processor, .. }
            | ConfigError::GroupNameMismatch { processor, .. }
            | ConfigError::InvalidValue { processor, .. } => Some(processor),
        }
    }
}
