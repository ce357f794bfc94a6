// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

use crate::{store::StoreError, trivia::SourceError};

/// Global Application Error Enum.
/// Every failure a learner or teacher can hit maps to one variant, and each variant
/// maps to one HTTP status.
#[derive(Debug)]
pub enum AppError {
    // 500 Internal Server Error
    InternalServerError(String),

    // 400 Bad Request
    BadRequest(String),

    // 400 Unknown subject or level
    InvalidSelection(String),

    // 400 Advance attempted with no answer chosen
    NoSelection,

    // 401 Unauthorized (bad credentials or missing role)
    AuthError(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict (e.g., quiz in the wrong state)
    Conflict(String),

    // 409 Email already registered as learner or teacher
    DuplicateAccount(String),

    // 502 Question source failed
    SourceUnavailable(String),
}

impl AppError {
    /// Stable machine-readable code sent alongside the message.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InternalServerError(_) => "internal",
            AppError::BadRequest(_) => "bad_request",
            AppError::InvalidSelection(_) => "invalid_selection",
            AppError::NoSelection => "no_selection",
            AppError::AuthError(_) => "authentication_failure",
            AppError::NotFound(_) => "not_found",
            AppError::Conflict(_) => "conflict",
            AppError::DuplicateAccount(_) => "duplicate_account",
            AppError::SourceUnavailable(_) => "source_unavailable",
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NoSelection => write!(f, "Select an answer before continuing"),
            AppError::InternalServerError(msg)
            | AppError::BadRequest(msg)
            | AppError::InvalidSelection(msg)
            | AppError::AuthError(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::DuplicateAccount(msg)
            | AppError::SourceUnavailable(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for AppError {}

/// Converts the error into a JSON response with appropriate HTTP status code.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();
        let (status, error_message) = match self {
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            AppError::BadRequest(msg) | AppError::InvalidSelection(msg) => {
                (StatusCode::BAD_REQUEST, msg)
            }
            AppError::NoSelection => (StatusCode::BAD_REQUEST, AppError::NoSelection.to_string()),
            AppError::AuthError(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) | AppError::DuplicateAccount(msg) => {
                (StatusCode::CONFLICT, msg)
            }
            AppError::SourceUnavailable(msg) => {
                tracing::warn!("Question source unavailable: {}", msg);
                (StatusCode::BAD_GATEWAY, msg)
            }
        };
        let body = Json(json!({
            "error": error_message,
            "code": code,
        }));

        (status, body).into_response()
    }
}

/// Serialization only fails on our own records, so it is never the caller's fault.
impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

impl From<SourceError> for AppError {
    fn from(err: SourceError) -> Self {
        AppError::SourceUnavailable(format!("Could not load quiz questions: {}", err))
    }
}
