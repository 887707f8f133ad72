//! Argon2 work moved off the async runtime.
//!
//! Hashing and verifying take tens of milliseconds of CPU each. They run on
//! tokio's blocking pool, and callers must not hold the repository lock
//! while awaiting them.

use hsk_core::accounts;

use crate::error::{ApiError, Result};

async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> std::result::Result<T, hsk_core::AccountError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(format!("password task failed: {e}")))?
        .map_err(ApiError::from)
}

pub async fn hash(password: &str) -> Result<String> {
    let password = password.to_string();
    blocking(move || accounts::hash_password(&password)).await
}

pub async fn verify(password: &str, hash: &str) -> Result<bool> {
    let password = password.to_string();
    let hash = hash.to_string();
    blocking(move || accounts::verify_password(&password, &hash)).await
}
