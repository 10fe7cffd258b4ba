//! Shared Error Types
//!
//! Error types that can occur on both the client and the server: rank key
//! derivation failures, validation failures, and serialization failures.
//!
//! All error types are `Send + Sync` and can be safely shared across thread
//! boundaries.

use thiserror::Error;

use crate::shared::rank::RankError;

/// Shared error types that can occur in both client and backend
#[derive(Debug, Error, Clone)]
pub enum SharedError {
    /// JSON serialization or deserialization error
    #[error("Serialization error: {message}")]
    SerializationError {
        /// Human-readable error message
        message: String,
    },

    /// Data validation error
    #[error("Validation error in field '{field}': {message}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Human-readable error message
        message: String,
    },

    /// Rank key validation or derivation error
    #[error(transparent)]
    RankError(#[from] RankError),
}

impl SharedError {
    /// Create a new serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::SerializationError {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for SharedError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(format!("JSON error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error() {
        let error = SharedError::validation("title", "must not be empty");
        match error {
            SharedError::ValidationError { field, message } => {
                assert_eq!(field, "title");
                assert_eq!(message, "must not be empty");
            }
            _ => panic!("Expected ValidationError"),
        }
    }

    #[test]
    fn test_from_rank_error() {
        let rank_error = crate::shared::rank::RankKey::new("").unwrap_err();
        let shared: SharedError = rank_error.into();
        assert!(matches!(shared, SharedError::RankError(_)));
    }

    #[test]
    fn test_from_serde_error() {
        let result: Result<serde_json::Value, _> = serde_json::from_str("{ nope }");
        let shared: SharedError = result.unwrap_err().into();
        assert!(matches!(shared, SharedError::SerializationError { .. }));
    }
}
