//! Error types for hsk-core.

use thiserror::Error;

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("corrupt record: {0}")]
    Corrupt(String),
}

/// Errors from registration, login and account management.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("passwords do not match")]
    PasswordMismatch,

    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    #[error("username already taken: {0}")]
    DuplicateUsername(String),

    #[error("username is reserved: {0}")]
    ReservedUsername(String),

    #[error("email already in use: {0}")]
    DuplicateEmail(String),

    #[error("phone number already in use: {0}")]
    DuplicatePhone(String),

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("device limit of {limit} reached; log out another device first")]
    DeviceLimitReached { limit: usize },

    #[error("user not found: {0}")]
    UserNotFound(String),

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors from quiz construction and play.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuizError {
    #[error("not enough words: need {required}, have {available}")]
    NotEnoughWords { required: usize, available: usize },

    #[error("card index {index} out of range")]
    InvalidCard { index: usize },

    #[error("round is not complete")]
    RoundInProgress,

    #[error("game is already complete")]
    GameComplete,
}
