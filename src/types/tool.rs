//! Tool calling types in the OpenAI-compatible wire shape.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Tool made available to the model (a function with a JSON Schema for its
/// arguments). The gateway forwards the schema opaquely and never
/// interprets tool semantics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    #[serde(rename = "type")]
    pub tool_type: String, // "function"
    pub function: FunctionSpec,
}

impl ToolSpec {
    pub fn function(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            tool_type: "function".to_string(),
            function: FunctionSpec {
                name: name.into(),
                description: Some(description.into()),
                parameters,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub parameters: serde_json::Value, // JSON Schema
}

/// Tool invocation emitted by the model inside an assistant message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type", default = "default_call_type")]
    pub call_type: String,
    pub function: FunctionCall,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// JSON-encoded argument object, passed through verbatim.
    #[serde(default)]
    pub arguments: String,
}

fn default_call_type() -> String {
    "function".to_string()
}

/// Tool-choice policy forwarded to the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolChoice {
    /// Let the model decide ("auto").
    Auto,
    /// Forbid tool calls ("none").
    None,
    /// Force some tool call ("required").
    Required,
    /// Force one specific function by name.
    Function(String),
}

impl Serialize for ToolChoice {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ToolChoice::Auto => serializer.serialize_str("auto"),
            ToolChoice::None => serializer.serialize_str("none"),
            ToolChoice::Required => serializer.serialize_str("required"),
            ToolChoice::Function(name) => {
                let value = serde_json::json!({
                    "type": "function",
                    "function": { "name": name },
                });
                value.serialize(serializer)
            }
        }
    }
}

impl<'de> Deserialize<'de> for ToolChoice {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        match &value {
            serde_json::Value::String(s) => match s.as_str() {
                "auto" => Ok(ToolChoice::Auto),
                "none" => Ok(ToolChoice::None),
                "required" => Ok(ToolChoice::Required),
                other => Err(D::Error::custom(format!("unknown tool_choice: {other}"))),
            },
            serde_json::Value::Object(_) => value["function"]["name"]
                .as_str()
                .map(|name| ToolChoice::Function(name.to_string()))
                .ok_or_else(|| D::Error::custom("tool_choice object missing function.name")),
            _ => Err(D::Error::custom("tool_choice must be a string or object")),
        }
    }
}
