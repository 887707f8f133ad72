//! External generative API used for practice exercises.
//!
//! Each call is made once: no retry, no timeout beyond the HTTP client's.
//! The model is asked for JSON matching a schema; a response wrapped in a
//! fenced code block is unwrapped before parsing.

use futures::future::BoxFuture;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("response contained no text")]
    Empty,

    #[error("response was not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

pub type GenerationResult<T> = std::result::Result<T, GenerationError>;

/// Generates a JSON document for a prompt, shaped by a response schema.
pub trait ExerciseGenerator: Send + Sync {
    fn generate<'a>(&'a self, prompt: &'a str, schema: &'a Value) -> BoxFuture<'a, GenerationResult<Value>>;
}

/// Strip a surrounding ```json fence, if any.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

pub fn parse_generated(text: &str) -> GenerationResult<Value> {
    let cleaned = strip_code_fence(text);
    if cleaned.is_empty() {
        return Err(GenerationError::Empty);
    }
    Ok(serde_json::from_str(cleaned)?)
}

/// Gemini `generateContent` client.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateResponse {
    fn text(self) -> Option<String> {
        let parts = self.candidates.into_iter().next()?.content?.parts;
        let text: String = parts.into_iter().filter_map(|p| p.text).collect();
        (!text.is_empty()).then_some(text)
    }
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: GEMINI_BASE_URL.to_string(),
        }
    }

    /// Point the client at another endpoint (e.g. a local stub).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    async fn generate_content(&self, prompt: &str, schema: &Value) -> GenerationResult<Value> {
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": schema,
            },
        });

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response.json().await?;
        let text = parsed.text().ok_or(GenerationError::Empty)?;
        parse_generated(&text)
    }
}

impl ExerciseGenerator for GeminiClient {
    fn generate<'a>(&'a self, prompt: &'a str, schema: &'a Value) -> BoxFuture<'a, GenerationResult<Value>> {
        Box::pin(self.generate_content(prompt, schema))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```\n[1]\n```"), "[1]");
        assert_eq!(strip_code_fence("  {\"a\":1} "), "{\"a\":1}");
    }

    #[test]
    fn test_parse_generated() {
        let value = parse_generated("```json\n{\"sentence\":\"你好。\"}\n```").unwrap();
        assert_eq!(value["sentence"], "你好。");
        assert!(matches!(parse_generated("not json"), Err(GenerationError::InvalidJson(_))));
        assert!(matches!(parse_generated("```json\n```"), Err(GenerationError::Empty)));
    }

    #[test]
    fn test_response_text_joins_parts() {
        let raw = json!({
            "candidates": [{ "content": { "parts": [{ "text": "{\"a\":" }, { "text": "1}" }] } }]
        });
        let parsed: GenerateResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(parsed.text().as_deref(), Some("{\"a\":1}"));

        let empty: GenerateResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(empty.text(), None);
    }

    #[test]
    fn test_endpoint_uses_model() {
        let client = GeminiClient::new("key", "gemini-2.5-flash").with_base_url("http://localhost:9/");
        assert_eq!(
            client.endpoint(),
            "http://localhost:9/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }
}
