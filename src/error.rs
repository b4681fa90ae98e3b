//! Error types for Ideaboard
//!
//! All errors in the application are converted to `AppError`,
//! which implements `IntoResponse` for proper HTTP error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Application-wide error type
///
/// This enum represents all possible errors that can occur
/// in the application. It implements `IntoResponse` to
/// automatically convert errors to appropriate HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Entity absent, or an id that matches nothing (404)
    #[error("{0}")]
    NotFound(String),

    /// Authentication required (401)
    #[error("Authentication required")]
    Unauthorized,

    /// Login failed; deliberately the same message for an unknown
    /// identifier and a wrong password (401)
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Authenticated but not the owner (401 for wire compatibility)
    #[error("{0}")]
    Forbidden(String),

    /// Validation error (400)
    #[error("{0}")]
    Validation(String),

    /// Username or email already taken (400)
    #[error("{0}")]
    Duplicate(String),

    /// Database error (500)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Token signing/verification key error (500)
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// Configuration error (500)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server error (500)
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl IntoResponse for AppError {
    /// Convert error to HTTP response
    ///
    /// Maps each error variant to the appropriate HTTP status code
    /// and a JSON `{"message": ...}` body. Unexpected failures are
    /// logged server-side and surface only a generic message.
    fn into_response(self) -> Response {
        use axum::Json;

        let (status, message, error_type) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone(), "not_found"),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string(), "unauthorized"),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                self.to_string(),
                "invalid_credentials",
            ),
            // Ownership failures report 401, not 403, to keep the wire
            // format of the original API.
            AppError::Forbidden(msg) => (StatusCode::UNAUTHORIZED, msg.clone(), "forbidden"),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone(), "validation"),
            AppError::Duplicate(msg) => (StatusCode::BAD_REQUEST, msg.clone(), "duplicate"),
            AppError::Database(error) => {
                tracing::error!(%error, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error".to_string(),
                    "database",
                )
            }
            AppError::Encryption(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone(), "encryption")
            }
            AppError::Config(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone(), "config"),
            AppError::Internal(error) => {
                tracing::error!(%error, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    "internal",
                )
            }
        };

        // Record error metric
        use crate::metrics::ERRORS_TOTAL;
        ERRORS_TOTAL
            .with_label_values(&[error_type, "unknown"])
            .inc();

        let body = Json(serde_json::json!({
            "message": message,
        }));

        (status, body).into_response()
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
