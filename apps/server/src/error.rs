//! Error handling for the HTTP API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use hsk_core::{AccountError, QuizError, StoreError};
use serde::Serialize;
use thiserror::Error;

use crate::db::DbError;
use crate::services::generator::GenerationError;

/// Message shown for any upstream generation failure.
pub const GENERATION_FAILED_MESSAGE: &str = "Failed to generate content. Please try again.";

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("Practice generation is not configured")]
    GenerationUnavailable,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            ApiError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "unauthorized"),
            ApiError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            ApiError::Generation(_) => (StatusCode::BAD_GATEWAY, "generation_failed"),
            ApiError::GenerationUnavailable => {
                (StatusCode::SERVICE_UNAVAILABLE, "generation_unavailable")
            }
            ApiError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "database_error"),
            ApiError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "storage_error"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        let message = match &self {
            ApiError::Generation(_) => GENERATION_FAILED_MESSAGE.to_string(),
            other => other.to_string(),
        };

        if status.is_server_error() {
            tracing::error!("{}", self);
        }

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::MissingField(_)
            | AccountError::PasswordMismatch
            | AccountError::InvalidEmail(_) => ApiError::BadRequest(err.to_string()),
            AccountError::DuplicateUsername(_)
            | AccountError::ReservedUsername(_)
            | AccountError::DuplicateEmail(_)
            | AccountError::DuplicatePhone(_)
            | AccountError::DeviceLimitReached { .. } => ApiError::Conflict(err.to_string()),
            AccountError::InvalidCredentials => ApiError::Unauthorized(err.to_string()),
            AccountError::UserNotFound(_) => ApiError::NotFound(err.to_string()),
            AccountError::Hashing(_) => ApiError::Internal(err.to_string()),
            AccountError::Store(e) => ApiError::Store(e),
        }
    }
}

impl From<QuizError> for ApiError {
    fn from(err: QuizError) -> Self {
        match err {
            QuizError::NotEnoughWords { .. } | QuizError::InvalidCard { .. } => {
                ApiError::BadRequest(err.to_string())
            }
            QuizError::RoundInProgress | QuizError::GameComplete => {
                ApiError::Conflict(err.to_string())
            }
        }
    }
}

impl From<GenerationError> for ApiError {
    fn from(err: GenerationError) -> Self {
        tracing::warn!(error = %err, "exercise generation failed");
        ApiError::Generation(err.to_string())
    }
}

/// Result type alias for API operations
pub type Result<T> = std::result::Result<T, ApiError>;
