//! Database error types.

use hsk_core::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("invalid json column: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("database lock poisoned")]
    Poisoned,
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Json(_) | DbError::InvalidData(_) => StoreError::Corrupt(err.to_string()),
            DbError::Sqlite(_) | DbError::Poisoned => StoreError::Backend(err.to_string()),
        }
    }
}
