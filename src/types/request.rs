//! Completion request types: the caller-facing request and the
//! provider-facing wire payload derived from it.

use serde::{Deserialize, Serialize};

use super::message::ChatMessage;
use super::tool::{ToolChoice, ToolSpec};

/// A chat completion request as submitted by a caller.
///
/// Immutable once constructed; the router only derives modified copies
/// (for example a stripped tool list during content-policy recovery).
#[derive(Debug, Clone, Default)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    /// Requested model id. Subject to per-provider translation; `None`
    /// selects each provider's default model.
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    pub top_p: Option<f64>,
    pub top_k: Option<u32>,
    pub frequency_penalty: Option<f64>,
    pub presence_penalty: Option<f64>,
    pub repetition_penalty: Option<f64>,
    pub seed: Option<i64>,
    pub stop: Option<StopSequences>,
    pub response_format: Option<serde_json::Value>,
    pub user: Option<String>,
    pub tools: Option<Vec<ToolSpec>>,
    pub tool_choice: Option<ToolChoice>,
    /// Provider to try first, ahead of the configured order.
    pub provider: Option<String>,
}

impl CompletionRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            ..Self::default()
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_top_p(mut self, top_p: f64) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn with_seed(mut self, seed: i64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_stop(mut self, stop: StopSequences) -> Self {
        self.stop = Some(stop);
        self
    }

    pub fn with_response_format(mut self, format: serde_json::Value) -> Self {
        self.response_format = Some(format);
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn with_tools(mut self, tools: Vec<ToolSpec>) -> Self {
        self.tools = Some(tools);
        self
    }

    pub fn with_tool_choice(mut self, tool_choice: ToolChoice) -> Self {
        self.tool_choice = Some(tool_choice);
        self
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    pub fn has_tools(&self) -> bool {
        self.tools.as_ref().is_some_and(|tools| !tools.is_empty())
    }
}

/// Stop sequences, accepted as a single string or a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StopSequences {
    One(String),
    Many(Vec<String>),
}

/// The JSON object POSTed to a provider's `/chat/completions` endpoint.
///
/// Built per provider attempt by the router; `model` has already been
/// translated and `messages` sanitized by the time one of these exists.
#[derive(Debug, Clone, Serialize)]
pub struct ChatPayload {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f64,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repetition_penalty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<StopSequences>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolSpec>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<ToolChoice>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_chain_sets_fields() {
        let request = CompletionRequest::new(vec![ChatMessage::user("hi")])
            .with_model("llama3-70b")
            .with_temperature(0.2)
            .with_max_tokens(256)
            .with_provider("local");
        assert_eq!(request.model.as_deref(), Some("llama3-70b"));
        assert_eq!(request.temperature, Some(0.2));
        assert_eq!(request.max_tokens, Some(256));
        assert_eq!(request.provider.as_deref(), Some("local"));
        assert!(!request.has_tools());
    }

    #[test]
    fn payload_omits_unset_optional_fields() {
        let payload = ChatPayload {
            model: "llama3-70b".to_string(),
            messages: vec![ChatMessage::user("hi")],
            temperature: 1.0,
            max_tokens: 500,
            top_p: None,
            top_k: None,
            frequency_penalty: None,
            presence_penalty: None,
            repetition_penalty: None,
            seed: None,
            stop: None,
            response_format: None,
            user: None,
            tools: None,
            tool_choice: None,
        };
        let json = serde_json::to_value(&payload).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(
            object.keys().collect::<Vec<_>>(),
            vec!["model", "messages", "temperature", "max_tokens"],
        );
    }

    #[test]
    fn payload_keeps_set_optional_fields() {
        let payload = ChatPayload {
            model: "llama3-70b".to_string(),
            messages: vec![ChatMessage::user("hi")],
            temperature: 0.7,
            max_tokens: 100,
            top_p: Some(0.9),
            top_k: Some(40),
            frequency_penalty: None,
            presence_penalty: None,
            repetition_penalty: Some(1.1),
            seed: Some(7),
            stop: Some(StopSequences::Many(vec!["END".to_string()])),
            response_format: None,
            user: Some("abc".to_string()),
            tools: None,
            tool_choice: None,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["top_p"], 0.9);
        assert_eq!(json["top_k"], 40);
        assert_eq!(json["repetition_penalty"], 1.1);
        assert_eq!(json["seed"], 7);
        assert_eq!(json["stop"][0], "END");
        assert_eq!(json["user"], "abc");
    }

    #[test]
    fn stop_sequences_accept_both_wire_forms() {
        let one: StopSequences = serde_json::from_str("\"END\"").unwrap();
        assert_eq!(one, StopSequences::One("END".to_string()));
        let many: StopSequences = serde_json::from_str(r#"["a","b"]"#).unwrap();
        assert_eq!(
            many,
            StopSequences::Many(vec!["a".to_string(), "b".to_string()])
        );
    }
}
