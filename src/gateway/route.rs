use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::Error;
use crate::prepare::{sanitize_messages, trim_to_budget};
use crate::types::{ChatMessage, ChatPayload, CompletionRequest, CompletionResponse};

use super::classify::Disposition;
use super::core::CompletionGateway;
use super::provider::ProviderClient;

impl CompletionGateway {
    /// Route a completion request across the configured providers.
    ///
    /// Messages are sanitized and trimmed once; each candidate then gets a
    /// payload built for its model-name format. Candidates run in order (a
    /// requested provider first) until one succeeds. A content-policy
    /// refusal from the primary triggers a bounded recovery pass; an
    /// unrecoverable error stops routing immediately. Anything else falls
    /// over to the next candidate, and when all are exhausted the last
    /// observed error is returned as-is.
    pub async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, Error> {
        let request_id = Uuid::new_v4();
        self.stats.record_request();

        let messages = trim_to_budget(
            sanitize_messages(&request.messages),
            self.config.max_conversation_tokens,
        );

        let candidates = self.candidate_order(request.provider.as_deref());
        if candidates.is_empty() {
            error!(request_id = %request_id, "no enabled providers to try");
            return Err(Error::NoProviders);
        }

        let primary = self.config.primary().map(|p| p.name.clone());
        let total = candidates.len();
        let mut last_err: Option<Error> = None;

        for (position, client) in candidates.iter().enumerate() {
            let payload = self.build_payload(&request, &messages, client);
            debug!(
                request_id = %request_id,
                provider = %client.name(),
                model = %payload.model,
                tool_count = payload.tools.as_ref().map_or(0, |t| t.len()),
                "attempting provider"
            );

            let started = Instant::now();
            match client.chat(&payload).await {
                Ok(response) => {
                    let elapsed_ms = started.elapsed().as_millis() as u64;
                    self.note_success(client, elapsed_ms);
                    info!(
                        request_id = %request_id,
                        provider = %client.name(),
                        model = %payload.model,
                        elapsed_ms,
                        "completion served"
                    );
                    return Ok(response);
                }
                Err(err) => {
                    self.board.mark_unhealthy(client.name(), err.to_string());
                    warn!(
                        request_id = %request_id,
                        provider = %client.name(),
                        error = %err,
                        "provider attempt failed"
                    );

                    let is_primary = primary.as_deref() == Some(client.name());
                    match self.classifier.classify(&err) {
                        Disposition::ContentPolicy if is_primary => {
                            return self
                                .content_policy_recovery(request_id, &request, client, payload, err)
                                .await;
                        }
                        Disposition::Unrecoverable => {
                            error!(
                                request_id = %request_id,
                                provider = %client.name(),
                                error = %err,
                                "unrecoverable error, skipping remaining providers"
                            );
                            return Err(err);
                        }
                        disposition => {
                            if disposition == Disposition::Fatal {
                                error!(
                                    request_id = %request_id,
                                    provider = %client.name(),
                                    "authentication failed"
                                );
                            }
                            let remaining = total - position - 1;
                            if remaining > 0 {
                                self.stats.record_failover();
                                warn!(
                                    request_id = %request_id,
                                    provider = %client.name(),
                                    remaining,
                                    "failing over to next provider"
                                );
                            }
                            last_err = Some(err);
                        }
                    }
                }
            }
        }

        error!(request_id = %request_id, "all providers exhausted");
        Err(last_err.unwrap_or(Error::NoProviders))
    }

    /// Bounded recovery after a content-policy refusal from the primary.
    ///
    /// Leg one swaps in the provider's unrestricted model, tools stripped.
    /// Leg two keeps the original model but strips tools, for requests that
    /// carried any. Either success returns immediately and counts as a
    /// provider success, not a failover. Both failing ends the route with
    /// the last observed error; no further providers are tried because the
    /// refusal travels with the conversation content.
    async fn content_policy_recovery(
        &self,
        request_id: Uuid,
        request: &CompletionRequest,
        client: &Arc<ProviderClient>,
        payload: ChatPayload,
        original: Error,
    ) -> Result<CompletionResponse, Error> {
        let mut last_err = original;

        if let Some(unrestricted) = client.config().unrestricted_model.clone() {
            warn!(
                request_id = %request_id,
                provider = %client.name(),
                model = %unrestricted,
                "content policy refusal, retrying with unrestricted model"
            );
            let mut attempt = payload.clone();
            attempt.model = unrestricted;
            attempt.tools = None;
            attempt.tool_choice = None;

            let started = Instant::now();
            match client.chat(&attempt).await {
                Ok(response) => {
                    self.note_success(client, started.elapsed().as_millis() as u64);
                    info!(
                        request_id = %request_id,
                        provider = %client.name(),
                        model = %attempt.model,
                        "content-policy recovery succeeded"
                    );
                    return Ok(response);
                }
                Err(err) => {
                    self.board.mark_unhealthy(client.name(), err.to_string());
                    last_err = err;
                }
            }
        }

        if request.has_tools() {
            warn!(
                request_id = %request_id,
                provider = %client.name(),
                "content policy refusal, retrying without tools"
            );
            let mut attempt = payload;
            attempt.tools = None;
            attempt.tool_choice = None;

            let started = Instant::now();
            match client.chat(&attempt).await {
                Ok(response) => {
                    self.note_success(client, started.elapsed().as_millis() as u64);
                    info!(
                        request_id = %request_id,
                        provider = %client.name(),
                        "tool-free recovery succeeded"
                    );
                    return Ok(response);
                }
                Err(err) => {
                    self.board.mark_unhealthy(client.name(), err.to_string());
                    last_err = err;
                }
            }
        }

        error!(
            request_id = %request_id,
            provider = %client.name(),
            error = %last_err,
            "content-policy recovery exhausted"
        );
        Err(last_err)
    }

    /// Enabled candidates in attempt order: the requested provider first
    /// when it exists, then the configured order. An unknown preference is
    /// ignored; a disabled one is filtered like any other.
    fn candidate_order(&self, preference: Option<&str>) -> Vec<Arc<ProviderClient>> {
        let mut order: Vec<Arc<ProviderClient>> = Vec::with_capacity(self.providers.len());
        if let Some(name) = preference {
            match self.providers.iter().find(|c| c.name() == name) {
                Some(preferred) => order.push(Arc::clone(preferred)),
                None => debug!(provider = name, "unknown provider preference ignored"),
            }
        }
        for client in &self.providers {
            if order.iter().any(|c| c.name() == client.name()) {
                continue;
            }
            order.push(Arc::clone(client));
        }
        order.retain(|c| c.is_enabled());
        order
    }

    fn build_payload(
        &self,
        request: &CompletionRequest,
        messages: &[ChatMessage],
        client: &ProviderClient,
    ) -> ChatPayload {
        let tools = request.tools.clone().filter(|t| !t.is_empty());
        // tool_choice means nothing without tools, so it travels with them.
        let tool_choice = if tools.is_some() {
            request.tool_choice.clone()
        } else {
            None
        };
        ChatPayload {
            model: client.effective_model(request.model.as_deref()),
            messages: messages.to_vec(),
            temperature: request
                .temperature
                .unwrap_or(self.config.default_temperature),
            max_tokens: request.max_tokens.unwrap_or(self.config.default_max_tokens),
            top_p: request.top_p,
            top_k: request.top_k,
            frequency_penalty: request.frequency_penalty,
            presence_penalty: request.presence_penalty,
            repetition_penalty: request.repetition_penalty,
            seed: request.seed,
            stop: request.stop.clone(),
            response_format: request.response_format.clone(),
            user: request.user.clone(),
            tools,
            tool_choice,
        }
    }

    fn note_success(&self, client: &Arc<ProviderClient>, elapsed_ms: u64) {
        self.stats.record_success(client.name());
        self.board.mark_healthy(client.name(), Some(elapsed_ms));
    }
}
