//! Server configuration from environment variables

use std::{env, fmt::Display, str::FromStr};

use tracing::{info, warn};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: String,
    /// JSON file replacing the bundled vocabulary.
    pub vocabulary_path: Option<String>,
    pub admin_username: String,
    /// Seeds the admin account when set.
    pub admin_password: Option<String>,
    /// Practice generation is disabled without a key.
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
}

impl Config {
    /// Read configuration after `.env` has been loaded.
    pub fn load() -> Self {
        Self {
            host: try_load("HOST", "0.0.0.0".to_string()),
            port: try_load("PORT", 3000),
            database_path: try_load("DATABASE_PATH", "hsk-tutor.db".to_string()),
            vocabulary_path: optional("VOCABULARY_PATH"),
            admin_username: try_load("ADMIN_USERNAME", "admin".to_string()),
            admin_password: optional("ADMIN_PASSWORD"),
            gemini_api_key: optional("GEMINI_API_KEY"),
            gemini_model: try_load("GEMINI_MODEL", DEFAULT_GEMINI_MODEL.to_string()),
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            database_path: "hsk-tutor.db".to_string(),
            vocabulary_path: None,
            admin_username: "admin".to_string(),
            admin_password: None,
            gemini_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
        }
    }
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Parse `key`, falling back to `default` when unset or unparseable.
fn try_load<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    let Ok(raw) = env::var(key) else {
        info!("{key} not set, using default: {default}");
        return default;
    };

    raw.parse().unwrap_or_else(|e| {
        warn!("Invalid {key} value: {e}, using default: {default}");
        default
    })
}
