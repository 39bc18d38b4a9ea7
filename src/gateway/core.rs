use std::fmt;
use std::sync::Arc;

use crate::config::GatewayConfig;
use crate::error::Error;
use crate::resilience::RateLimiter;

use super::builder::GatewayBuilder;
use super::classify::ErrorClassifier;
use super::health::{ProviderStatus, StatusBoard};
use super::provider::ProviderClient;
use super::stats::{GatewayStats, StatsSnapshot};

/// Multi-provider completion gateway.
///
/// Routes each request across the configured providers in order, retrying
/// transient failures per provider and failing over between them. See
/// [`complete`](CompletionGateway::complete) for the routing contract; the
/// methods here form the administrative surface.
pub struct CompletionGateway {
    pub(super) config: GatewayConfig,
    pub(super) providers: Vec<Arc<ProviderClient>>,
    pub(super) classifier: ErrorClassifier,
    pub(super) stats: Arc<GatewayStats>,
    pub(super) board: StatusBoard,
    pub(super) limiter: Arc<RateLimiter>,
}

impl fmt::Debug for CompletionGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionGateway").finish_non_exhaustive()
    }
}

impl CompletionGateway {
    /// Build a gateway with production defaults. Equivalent to
    /// `CompletionGateway::builder(config).build()`.
    pub fn new(config: GatewayConfig) -> Result<Self, Error> {
        GatewayBuilder::new(config).build()
    }

    pub fn builder(config: GatewayConfig) -> GatewayBuilder {
        GatewayBuilder::new(config)
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn statistics(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub fn reset_statistics(&self) {
        self.stats.reset();
    }

    /// Last known status per provider, in configuration order.
    pub fn provider_status(&self) -> Vec<ProviderStatus> {
        self.board.snapshot()
    }

    /// The shared admission limiter. External dispatchers (tool executors
    /// and the like) can guard their own operations with the same instance.
    pub fn rate_limiter(&self) -> Arc<RateLimiter> {
        Arc::clone(&self.limiter)
    }

    /// Probe one provider now and record the result on the status board.
    ///
    /// Disabled providers are reported unhealthy without a network call.
    pub async fn check_health(&self, name: &str) -> Result<ProviderStatus, Error> {
        let client = self.client(name)?;
        let status = if client.is_enabled() {
            client.probe().await
        } else {
            ProviderStatus::unhealthy(client.name(), "provider is disabled")
        };
        self.board.update(status.clone());
        Ok(status)
    }

    /// Probe every configured provider concurrently.
    pub async fn health_check_all(&self) -> Vec<ProviderStatus> {
        let probes = self.providers.iter().map(|client| async move {
            if client.is_enabled() {
                client.probe().await
            } else {
                ProviderStatus::unhealthy(client.name(), "provider is disabled")
            }
        });
        let statuses = futures::future::join_all(probes).await;
        for status in &statuses {
            self.board.update(status.clone());
        }
        statuses
    }

    /// Model ids advertised by one provider (cached per provider).
    pub async fn models(&self, provider: &str) -> Result<Vec<String>, Error> {
        self.client(provider)?.models().await
    }

    pub(super) fn client(&self, name: &str) -> Result<&Arc<ProviderClient>, Error> {
        self.providers
            .iter()
            .find(|client| client.name() == name)
            .ok_or_else(|| Error::configuration(format!("unknown provider: {name}")))
    }
}
