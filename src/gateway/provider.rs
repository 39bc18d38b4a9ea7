use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::{debug, warn};

use crate::config::{ModelFormat, ProviderConfig};
use crate::error::Error;
use crate::resilience::{BackoffPolicy, RateLimiter};
use crate::transport::{RawResponse, Transport, TransportError};
use crate::types::response::embedded_error;
use crate::types::{ChatPayload, CompletionResponse};

use super::health::ProviderStatus;

const HEALTH_TIMEOUT: Duration = Duration::from_secs(10);
const MODELS_CACHE_TTL: Duration = Duration::from_secs(300);
const ERROR_BODY_LIMIT: usize = 200;

/// One configured provider plus the retry machinery around calling it.
///
/// The router owns a `ProviderClient` per configured provider; all of them
/// share one transport and one rate limiter. Each completion attempt is
/// admitted under the provider's name as the rate-limit operation.
pub struct ProviderClient {
    config: ProviderConfig,
    transport: Arc<dyn Transport>,
    limiter: Arc<RateLimiter>,
    backoff: BackoffPolicy,
    models_cache: Mutex<Option<(Instant, Vec<String>)>>,
}

impl ProviderClient {
    pub fn new(
        config: ProviderConfig,
        transport: Arc<dyn Transport>,
        limiter: Arc<RateLimiter>,
        backoff: BackoffPolicy,
    ) -> Self {
        Self {
            config,
            transport,
            limiter,
            backoff,
            models_cache: Mutex::new(None),
        }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Model id to put on the wire for this provider.
    ///
    /// A `plain` provider cannot serve namespaced ids (`vendor/model`) or
    /// routing-suffixed ones (`model:free`); those fall back to its default
    /// model instead of being forwarded verbatim.
    pub fn effective_model(&self, requested: Option<&str>) -> String {
        let requested = match requested {
            Some(model) if !model.is_empty() => model,
            _ => return self.config.default_model.clone(),
        };
        match self.config.model_format {
            ModelFormat::Namespaced => requested.to_string(),
            ModelFormat::Plain => {
                if requested.contains('/') || requested.ends_with(":free") {
                    self.config.default_model.clone()
                } else {
                    requested.to_string()
                }
            }
        }
    }

    /// Send one chat payload, retrying transient failures.
    ///
    /// Up to `max_retries + 1` attempts. 429 and 5xx replies back off
    /// exponentially with jitter; timeouts pause a flat `base_delay`;
    /// connection failures back off without jitter. 401, other 4xx,
    /// embedded provider errors and unparseable bodies return immediately.
    /// Every attempt is admitted by the rate limiter first; a denial
    /// surfaces as [`Error::RateLimitedLocal`] without touching the network.
    pub async fn chat(&self, payload: &ChatPayload) -> Result<CompletionResponse, Error> {
        if !self.config.enabled {
            return Err(Error::Provider {
                provider: self.config.name.clone(),
                message: "provider is disabled".to_string(),
                unrecoverable: false,
            });
        }

        let body = serde_json::to_value(payload)?;
        let url = self.config.chat_url();
        let api_key = self.config.resolve_api_key();
        let attempts = self.backoff.max_retries.saturating_add(1);

        for attempt in 0..attempts {
            if !self.limiter.admit(&self.config.name) {
                warn!(provider = %self.config.name, "local rate limit reached");
                return Err(Error::RateLimitedLocal {
                    operation: self.config.name.clone(),
                });
            }

            let outcome = self
                .transport
                .post_json(&url, api_key.as_deref(), &body, Some(self.config.timeout()))
                .await;

            let last_attempt = attempt + 1 >= attempts;
            let retry_in = match outcome {
                Ok(raw) if raw.is_success() => return self.parse_completion(&raw),
                Ok(raw) => match raw.status {
                    401 => {
                        return Err(Error::Authentication {
                            provider: self.config.name.clone(),
                        })
                    }
                    429 => {
                        if last_attempt {
                            return Err(Error::RateLimitedRemote {
                                provider: self.config.name.clone(),
                            });
                        }
                        self.backoff.delay_with_jitter(attempt)
                    }
                    500..=599 => {
                        if last_attempt {
                            return Err(self.http_error(&raw));
                        }
                        self.backoff.delay_with_jitter(attempt)
                    }
                    _ => return Err(self.http_error(&raw)),
                },
                Err(TransportError::Timeout) => {
                    if last_attempt {
                        return Err(Error::Timeout {
                            provider: self.config.name.clone(),
                        });
                    }
                    self.backoff.base_delay
                }
                Err(TransportError::Connect(message)) => {
                    if last_attempt {
                        return Err(Error::Connection {
                            provider: self.config.name.clone(),
                            message,
                        });
                    }
                    self.backoff.delay(attempt)
                }
                Err(other) => return Err(Error::Transport(other)),
            };

            warn!(
                provider = %self.config.name,
                attempt,
                delay_ms = retry_in.as_millis() as u64,
                "transient failure, retrying"
            );
            tokio::time::sleep(retry_in).await;
        }

        // The final iteration always returns above; this only guards the
        // degenerate zero-attempt case.
        Err(Error::Provider {
            provider: self.config.name.clone(),
            message: "retry budget exhausted".to_string(),
            unrecoverable: false,
        })
    }

    fn parse_completion(&self, raw: &RawResponse) -> Result<CompletionResponse, Error> {
        let value: Value = serde_json::from_str(&raw.body)?;
        if let Some(embedded) = embedded_error(&value) {
            return Err(Error::Provider {
                provider: self.config.name.clone(),
                message: embedded.message,
                unrecoverable: embedded.unrecoverable,
            });
        }
        Ok(serde_json::from_value(value)?)
    }

    fn http_error(&self, raw: &RawResponse) -> Error {
        Error::Http {
            provider: self.config.name.clone(),
            status: raw.status,
            message: truncate_body(&raw.body),
        }
    }

    /// Probe the models endpoint with a short deadline and map the outcome
    /// to a status record. Never retries.
    pub async fn probe(&self) -> ProviderStatus {
        let url = self.config.models_url();
        let api_key = self.config.resolve_api_key();
        let started = Instant::now();
        let outcome = self
            .transport
            .get(&url, api_key.as_deref(), Some(HEALTH_TIMEOUT))
            .await;
        let latency_ms = started.elapsed().as_millis() as u64;

        match outcome {
            Ok(raw) if raw.status == 200 => {
                ProviderStatus::healthy(&self.config.name, Some(latency_ms))
            }
            Ok(raw) if raw.status == 401 => {
                ProviderStatus::unhealthy(&self.config.name, "invalid API key")
            }
            Ok(raw) => {
                ProviderStatus::unhealthy(&self.config.name, format!("HTTP {}", raw.status))
            }
            Err(TransportError::Timeout) => {
                ProviderStatus::unhealthy(&self.config.name, "request timeout")
            }
            Err(TransportError::Connect(_)) => {
                ProviderStatus::unhealthy(&self.config.name, "cannot connect to service")
            }
            Err(other) => ProviderStatus::unhealthy(&self.config.name, other.to_string()),
        }
    }

    /// Model ids this provider advertises, cached for five minutes.
    pub async fn models(&self) -> Result<Vec<String>, Error> {
        if let Some(cached) = self.cached_models() {
            debug!(provider = %self.config.name, "serving model list from cache");
            return Ok(cached);
        }

        let url = self.config.models_url();
        let api_key = self.config.resolve_api_key();
        let raw = self
            .transport
            .get(&url, api_key.as_deref(), Some(self.config.timeout()))
            .await
            .map_err(|e| self.map_transport(e))?;

        match raw.status {
            200 => {
                let value: Value = serde_json::from_str(&raw.body)?;
                let ids: Vec<String> = value
                    .get("data")
                    .and_then(Value::as_array)
                    .map(|models| {
                        models
                            .iter()
                            .filter_map(|m| m.get("id").and_then(Value::as_str))
                            .map(str::to_string)
                            .collect()
                    })
                    .unwrap_or_default();
                let mut cache = self.models_cache.lock().unwrap_or_else(|p| p.into_inner());
                *cache = Some((Instant::now(), ids.clone()));
                Ok(ids)
            }
            401 => Err(Error::Authentication {
                provider: self.config.name.clone(),
            }),
            _ => Err(self.http_error(&raw)),
        }
    }

    fn cached_models(&self) -> Option<Vec<String>> {
        let cache = self.models_cache.lock().unwrap_or_else(|p| p.into_inner());
        cache
            .as_ref()
            .and_then(|(at, ids)| (at.elapsed() < MODELS_CACHE_TTL).then(|| ids.clone()))
    }

    fn map_transport(&self, err: TransportError) -> Error {
        match err {
            TransportError::Timeout => Error::Timeout {
                provider: self.config.name.clone(),
            },
            TransportError::Connect(message) => Error::Connection {
                provider: self.config.name.clone(),
                message,
            },
            other => Error::Transport(other),
        }
    }
}

fn truncate_body(body: &str) -> String {
    let trimmed = body.trim();
    let mut end = trimmed.len().min(ERROR_BODY_LIMIT);
    while !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    trimmed[..end].to_string()
}
