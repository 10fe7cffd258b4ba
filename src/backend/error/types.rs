/**
 * Backend Error Types
 *
 * This module defines error types specific to the backend server.
 * These errors are used in HTTP handlers and can be converted to HTTP responses.
 *
 * # Error Categories
 *
 * - `NotFound` - a referenced board, column or card does not exist
 * - `InvalidPosition` - a positional hint that cannot be interpreted
 * - `DatabaseUnavailable` - the server started without a database pool
 * - `Database` - an error surfaced by sqlx during a transaction
 * - `Shared` / `Serialization` - wrapped lower-level errors
 */

use axum::http::StatusCode;
use thiserror::Error;
use uuid::Uuid;

use crate::shared::SharedError;

/// Backend-specific error types
///
/// Each variant carries enough context for a useful HTTP error body and maps
/// to one status code via [`BackendError::status_code`].
#[derive(Debug, Error)]
pub enum BackendError {
    /// A referenced entity does not exist
    #[error("{resource} {id} not found")]
    NotFound {
        /// Entity kind ("board", "column", "card")
        resource: &'static str,
        id: Uuid,
    },

    /// A positional hint outside what the request can mean (negative index)
    #[error("invalid position: {index}")]
    InvalidPosition { index: i64 },

    /// The server is running without a configured database
    #[error("database is not configured")]
    DatabaseUnavailable,

    /// Query or transaction failure
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Shared error (validation, rank key parsing)
    #[error(transparent)]
    Shared(#[from] SharedError),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BackendError {
    /// Create a not-found error for a named resource
    pub fn not_found(resource: &'static str, id: Uuid) -> Self {
        Self::NotFound { resource, id }
    }

    /// Get the HTTP status code for this error
    ///
    /// # Status Code Mapping
    ///
    /// - `NotFound` - 404 Not Found
    /// - `InvalidPosition` - 400 Bad Request
    /// - `DatabaseUnavailable` - 503 Service Unavailable
    /// - `Database` - 500 Internal Server Error
    /// - `Shared` - depends on the shared error type
    /// - `Serialization` - 500 Internal Server Error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::InvalidPosition { .. } => StatusCode::BAD_REQUEST,
            Self::DatabaseUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Shared(err) => match err {
                SharedError::SerializationError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
                SharedError::ValidationError { .. } => StatusCode::BAD_REQUEST,
                SharedError::RankError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error message for the response body
    pub fn message(&self) -> String {
        self.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_404() {
        let id = Uuid::new_v4();
        let error = BackendError::not_found("column", id);
        assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
        assert!(error.message().contains(&id.to_string()));
    }

    #[test]
    fn test_invalid_position_maps_to_400() {
        let error = BackendError::InvalidPosition { index: -3 };
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
        assert!(error.message().contains("-3"));
    }

    #[test]
    fn test_database_unavailable_maps_to_503() {
        assert_eq!(
            BackendError::DatabaseUnavailable.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_from_shared_validation_maps_to_400() {
        let shared = SharedError::validation("target_index", "must name items in the container");
        let error: BackendError = shared.into();
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
    }
}
