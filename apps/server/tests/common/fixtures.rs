//! Request bodies used across the API tests.

use serde_json::{json, Value};

use super::PASSWORD;

/// Registration form with a matching confirmation and unique contact details.
pub fn registration(username: &str) -> Value {
    json!({
        "username": username,
        "password": PASSWORD,
        "confirm_password": PASSWORD,
        "email": format!("{}@example.com", username),
        "phone": format!("555-{}", username),
    })
}

pub fn login(identifier: &str, password: &str, device_id: &str) -> Value {
    json!({
        "identifier": identifier,
        "password": password,
        "device_id": device_id,
    })
}

pub fn lesson(level: u8, lesson: u32) -> Value {
    json!({ "level": level, "lesson": lesson })
}

pub fn mastery(character: &str, outcome: &str) -> Value {
    json!({ "character": character, "outcome": outcome })
}

/// Canned generator reply for an example sentence.
pub fn example_sentence() -> Value {
    json!({ "sentence": "我爱你。", "translation": "I love you." })
}
