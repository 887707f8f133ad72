//! Services behind the route handlers.

pub mod generator;
pub mod passwords;
pub mod practice;
pub mod quiz_sessions;
pub mod tokens;
