//! Gateway configuration structures
//!
//! Everything here deserializes from YAML. Missing fields fall back to the
//! defaults below, so a minimal file only needs the provider list.

use std::collections::HashSet;
use std::env;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Top-level configuration for a [`CompletionGateway`](crate::gateway::CompletionGateway).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Providers in priority order. The first entry is the primary.
    pub providers: Vec<ProviderConfig>,

    /// Estimated-token budget applied to conversations before dispatch.
    #[serde(default = "default_max_conversation_tokens")]
    pub max_conversation_tokens: usize,

    /// Sampling temperature used when a request does not set one.
    #[serde(default = "default_temperature")]
    pub default_temperature: f64,

    /// Completion length cap used when a request does not set one.
    #[serde(default = "default_max_tokens")]
    pub default_max_tokens: u32,

    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub classifier: ClassifierConfig,
}

impl GatewayConfig {
    pub fn from_yaml_str(content: &str) -> Result<Self, Error> {
        let config: Self = serde_yaml::from_str(content)
            .map_err(|e| Error::configuration(format!("invalid configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::configuration(format!("cannot read {}: {e}", path.display())))?;
        Self::from_yaml_str(&content)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.providers.is_empty() {
            return Err(Error::configuration("at least one provider is required"));
        }
        let mut seen = HashSet::new();
        for provider in &self.providers {
            if provider.name.trim().is_empty() {
                return Err(Error::configuration("provider name cannot be empty"));
            }
            if !seen.insert(provider.name.as_str()) {
                return Err(Error::configuration(format!(
                    "duplicate provider name: {}",
                    provider.name
                )));
            }
            url::Url::parse(&provider.base_url).map_err(|e| {
                Error::configuration(format!("invalid base_url for {}: {e}", provider.name))
            })?;
        }
        Ok(())
    }

    /// The first configured provider, enabled or not.
    pub fn primary(&self) -> Option<&ProviderConfig> {
        self.providers.first()
    }

    pub fn provider(&self, name: &str) -> Option<&ProviderConfig> {
        self.providers.iter().find(|p| p.name == name)
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            providers: Vec::new(),
            max_conversation_tokens: default_max_conversation_tokens(),
            default_temperature: default_temperature(),
            default_max_tokens: default_max_tokens(),
            retry: RetryConfig::default(),
            classifier: ClassifierConfig::default(),
        }
    }
}

/// One upstream completion service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub name: String,

    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Root URL; operation paths are appended to it.
    pub base_url: String,

    /// Bearer token. When absent the `{NAME}_API_KEY` environment variable
    /// is consulted at request time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    pub default_model: String,

    /// Substitute model for content-policy recovery, if the provider has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unrestricted_model: Option<String>,

    #[serde(default)]
    pub model_format: ModelFormat,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Local admission budget for this provider's completion traffic.
    #[serde(default = "default_requests_per_minute")]
    pub requests_per_minute: u32,
}

impl ProviderConfig {
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        default_model: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            enabled: default_enabled(),
            base_url: base_url.into(),
            api_key: None,
            default_model: default_model.into(),
            unrestricted_model: None,
            model_format: ModelFormat::default(),
            timeout_secs: default_timeout_secs(),
            requests_per_minute: default_requests_per_minute(),
        }
    }

    pub fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    pub fn models_url(&self) -> String {
        format!("{}/models", self.base_url.trim_end_matches('/'))
    }

    /// Configured key first, then the `{NAME}_API_KEY` environment variable
    /// with the name uppercased and dashes mapped to underscores.
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(key) = &self.api_key {
            if !key.is_empty() {
                return Some(key.clone());
            }
        }
        let var = format!("{}_API_KEY", self.name.to_uppercase().replace('-', "_"));
        env::var(var).ok()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// How a provider expects model names on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelFormat {
    /// Bare model ids. Namespaced or `:free` suffixed names are replaced
    /// with the provider's default model.
    #[default]
    Plain,
    /// `vendor/model` ids are passed through verbatim.
    Namespaced,
}

/// Retry pacing for a single provider attempt sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

/// Marker phrases the error classifier matches against provider error text.
///
/// Matching is case-insensitive substring search, so entries should be
/// lowercase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Phrases that flag provider-side content filtering.
    #[serde(default = "default_content_policy_markers")]
    pub content_policy_markers: Vec<String>,
    /// Phrases for defects no retry or provider switch can fix.
    #[serde(default = "default_unrecoverable_markers")]
    pub unrecoverable_markers: Vec<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            content_policy_markers: default_content_policy_markers(),
            unrecoverable_markers: default_unrecoverable_markers(),
        }
    }
}

fn default_max_conversation_tokens() -> usize {
    1_500
}

fn default_temperature() -> f64 {
    1.0
}

fn default_max_tokens() -> u32 {
    500
}

fn default_enabled() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_requests_per_minute() -> u32 {
    60
}

fn default_max_retries() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    1_000
}

fn default_max_delay_ms() -> u64 {
    30_000
}

fn default_content_policy_markers() -> Vec<String> {
    [
        "data inspection failed",
        "datainspectionfailed",
        "content filter",
        "inappropriate content",
        "safety",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_unrecoverable_markers() -> Vec<String> {
    [
        "invalid request",
        "bad request",
        "context length",
        "maximum context",
        "too large",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
