//! Error types for the Dyelab application.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::schema::ValidationError;
use crate::session::ConversationState;

/// A shared error type for the entire Dyelab workspace.
///
/// Each variant maps to exactly one outcome: validation errors are recovered
/// locally by treating the value as missing, model and extraction failures
/// end the affected session, and the remaining variants surface to the caller.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum DyelabError {
    /// A parameter value failed schema validation.
    #[error("Validation error: {0}")]
    Validation(ValidationError),

    /// Prediction was attempted on a record with missing fields.
    #[error("Incomplete input: missing {}", .missing.join(", "))]
    IncompleteInput { missing: Vec<String> },

    /// The regression model artifact could not be loaded.
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    /// The extraction step errored or returned unparseable output.
    #[error("Extraction failed: {0}")]
    Extraction(String),

    /// A conversation state transition that the state machine does not allow.
    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition {
        from: ConversationState,
        to: ConversationState,
    },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DyelabError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates an IncompleteInput error from the missing field names.
    pub fn incomplete<I, S>(missing: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::IncompleteInput {
            missing: missing.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates a ModelUnavailable error
    pub fn model_unavailable(message: impl Into<String>) -> Self {
        Self::ModelUnavailable(message.into())
    }

    /// Creates an Extraction error
    pub fn extraction(message: impl Into<String>) -> Self {
        Self::Extraction(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is an incomplete input error
    pub fn is_incomplete_input(&self) -> bool {
        matches!(self, Self::IncompleteInput { .. })
    }

    /// Check if this is a model unavailable error
    pub fn is_model_unavailable(&self) -> bool {
        matches!(self, Self::ModelUnavailable(_))
    }

    /// Check if this is an extraction failure
    pub fn is_extraction(&self) -> bool {
        matches!(self, Self::Extraction(_))
    }

    /// Returns the missing field names for an IncompleteInput error.
    pub fn missing_fields(&self) -> &[String] {
        match self {
            Self::IncompleteInput { missing } => missing,
            _ => &[],
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<ValidationError> for DyelabError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

impl From<std::io::Error> for DyelabError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for DyelabError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for DyelabError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, DyelabError>`.
pub type Result<T> = std::result::Result<T, DyelabError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incomplete_input_lists_missing_fields() {
        let err = DyelabError::incomplete(["pH", "salt_gL"]);
        assert!(err.is_incomplete_input());
        assert_eq!(err.missing_fields(), &["pH".to_string(), "salt_gL".to_string()]);
        assert_eq!(err.to_string(), "Incomplete input: missing pH, salt_gL");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: DyelabError = io.into();
        match err {
            DyelabError::Io { message } => assert!(message.contains("NotFound")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
