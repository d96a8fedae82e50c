//! API error types and responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::auth::AuthError;
use crate::config::ConfigError;

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Bad request - missing or malformed input.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Unauthorized - wrong credentials or no token.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Forbidden - token failed verification.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Internal server error, typically a failed store write.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Log a failed store write and surface `message` to the caller.
    pub fn storage(message: &str, err: &rehber_store::StoreError) -> Self {
        tracing::error!(error = %err, "{message}");
        Self::Internal(message.to_string())
    }
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            Self::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = ErrorResponse {
            success: false,
            error: message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingToken => Self::Unauthorized("Erişim tokenı gerekli".into()),
            AuthError::InvalidToken => Self::Forbidden("Geçersiz token".into()),
        }
    }
}

/// Errors that abort startup.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The store could not be opened.
    #[error(transparent)]
    Store(#[from] rehber_store::StoreError),
}
