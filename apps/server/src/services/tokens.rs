//! Bearer session tokens.

use sha2::{Digest, Sha256};
use uuid::Uuid;

/// A fresh random token handed to the client once.
pub fn new_token() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

/// SHA-256 hex digest; the only form of a token that is stored.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}
