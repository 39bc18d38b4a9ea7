//! Completion response parsing.
//!
//! Providers signal failure two ways: a non-200 status, or an `error`
//! field embedded in an otherwise successful body. The retry engine checks
//! for the embedded form before this module's types ever see the body.

use serde::{Deserialize, Serialize};

use super::message::Role;
use super::tool::ToolCall;

/// Parsed chat completion response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<u64>,
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

impl CompletionResponse {
    /// Text content of the first choice, if any.
    pub fn content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
    }

    /// Tool calls requested by the first choice; empty when there are none.
    pub fn tool_calls(&self) -> &[ToolCall] {
        self.choices
            .first()
            .and_then(|choice| choice.message.tool_calls.as_deref())
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub index: u32,
    pub message: ResponseMessage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
}

/// Provider-level error found in an HTTP 200 body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedError {
    pub message: String,
    /// Explicit flag some backends attach next to the error; when set there
    /// is no point retrying the payload anywhere.
    pub unrecoverable: bool,
}

/// Extract an embedded `error` field. The field may be a bare string or an
/// object carrying a `message`.
pub fn embedded_error(body: &serde_json::Value) -> Option<EmbeddedError> {
    let error = body.get("error")?;
    if error.is_null() {
        return None;
    }
    let message = match error {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Object(map) => map
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("Unknown error")
            .to_string(),
        other => other.to_string(),
    };
    let unrecoverable = body
        .get("unrecoverable")
        .and_then(|flag| flag.as_bool())
        .unwrap_or(false);
    Some(EmbeddedError {
        message,
        unrecoverable,
    })
}
