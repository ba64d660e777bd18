// src/error.rs

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

use crate::services::scoring::ScoringError;

/// Global Application Error Enum.
/// Centralizes error handling and mapping to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    // 500 Internal Server Error
    InternalServerError(String),

    // 400 Bad Request
    BadRequest(String),

    // 404 Not Found
    NotFound(String),

    // 503 Service Unavailable (question catalog could not be read)
    CatalogUnavailable(String),

    // 500 Internal Server Error (result could not be recorded)
    PersistenceFailed(String),

    // 504 Gateway Timeout (a collaborator exceeded the request deadline)
    Timeout(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::InternalServerError(msg) => write!(f, "internal error: {}", msg),
            AppError::BadRequest(msg) => write!(f, "bad request: {}", msg),
            AppError::NotFound(msg) => write!(f, "not found: {}", msg),
            AppError::CatalogUnavailable(msg) => write!(f, "question catalog unavailable: {}", msg),
            AppError::PersistenceFailed(msg) => write!(f, "failed to save result: {}", msg),
            AppError::Timeout(msg) => write!(f, "timed out: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

/// Implements `IntoResponse` for `AppError`.
/// Server-side failures are logged and replaced by a generic message.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            AppError::CatalogUnavailable(msg) => {
                tracing::error!("Question catalog unavailable: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Database query error".to_string(),
                )
            }
            AppError::PersistenceFailed(msg) => {
                tracing::error!("Failed to save result: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to save result".to_string(),
                )
            }
            AppError::Timeout(msg) => {
                tracing::error!("Request deadline exceeded: {}", msg);
                (StatusCode::GATEWAY_TIMEOUT, "Request timed out".to_string())
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        };
        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Converts `sqlx::Error` into `AppError::InternalServerError`.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

/// Body that is not JSON, or JSON of the wrong shape (e.g. a numeric `userId`
/// or a non-numeric question id). Always a 400 with the usual error body.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// Only reached under the strict scoring policy: a bad answer is the caller's
/// fault, a broken question is ours.
impl From<ScoringError> for AppError {
    fn from(err: ScoringError) -> Self {
        match err {
            ScoringError::MalformedAnswer { .. } => AppError::BadRequest(err.to_string()),
            ScoringError::InvalidQuestion { .. } => AppError::InternalServerError(err.to_string()),
        }
    }
}
