use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::config::GatewayConfig;
use crate::error::Error;
use crate::resilience::{BackoffPolicy, RateLimiter};
use crate::transport::{HttpTransport, Transport};

use super::classify::ErrorClassifier;
use super::core::CompletionGateway;
use super::health::StatusBoard;
use super::provider::ProviderClient;
use super::stats::GatewayStats;

const DEFAULT_CLIENT_TIMEOUT: Duration = Duration::from_secs(60);

/// Assembles a [`CompletionGateway`].
///
/// Every collaborator can be injected: tests swap the transport for a
/// scripted double, embedders can share one rate limiter or statistics
/// block across several gateways. Whatever is not injected is built with
/// production defaults.
pub struct GatewayBuilder {
    config: GatewayConfig,
    transport: Option<Arc<dyn Transport>>,
    limiter: Option<Arc<RateLimiter>>,
    stats: Option<Arc<GatewayStats>>,
    classifier: Option<ErrorClassifier>,
}

impl GatewayBuilder {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            config,
            transport: None,
            limiter: None,
            stats: None,
            classifier: None,
        }
    }

    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn with_rate_limiter(mut self, limiter: Arc<RateLimiter>) -> Self {
        self.limiter = Some(limiter);
        self
    }

    pub fn with_stats(mut self, stats: Arc<GatewayStats>) -> Self {
        self.stats = Some(stats);
        self
    }

    pub fn with_classifier(mut self, classifier: ErrorClassifier) -> Self {
        self.classifier = Some(classifier);
        self
    }

    pub fn build(self) -> Result<CompletionGateway, Error> {
        self.config.validate()?;

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new(DEFAULT_CLIENT_TIMEOUT)?),
        };
        let limiter = self
            .limiter
            .unwrap_or_else(|| Arc::new(RateLimiter::new(60)));
        let stats = self.stats.unwrap_or_else(|| Arc::new(GatewayStats::new()));
        let classifier = self
            .classifier
            .unwrap_or_else(|| ErrorClassifier::new(&self.config.classifier));

        let backoff = BackoffPolicy::from_config(&self.config.retry);
        let mut providers = Vec::with_capacity(self.config.providers.len());
        for provider in &self.config.providers {
            limiter.set_budget(&provider.name, provider.requests_per_minute);
            stats.register_provider(&provider.name);
            providers.push(Arc::new(ProviderClient::new(
                provider.clone(),
                Arc::clone(&transport),
                Arc::clone(&limiter),
                backoff.clone(),
            )));
        }

        let board = StatusBoard::new(self.config.providers.iter().map(|p| p.name.clone()));

        info!(
            providers = providers.len(),
            primary = self
                .config
                .primary()
                .map(|p| p.name.as_str())
                .unwrap_or_default(),
            "completion gateway initialized"
        );

        Ok(CompletionGateway {
            config: self.config,
            providers,
            classifier,
            stats,
            board,
            limiter,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderConfig;

    fn two_provider_config() -> GatewayConfig {
        let mut primary = ProviderConfig::new("local", "http://localhost:11434/v1", "small-chat");
        primary.requests_per_minute = 2;
        let fallback = ProviderConfig::new("remote", "https://api.example.com/v1", "big-chat");
        GatewayConfig {
            providers: vec![primary, fallback],
            ..GatewayConfig::default()
        }
    }

    #[test]
    fn test_build_rejects_invalid_config() {
        let err = GatewayBuilder::new(GatewayConfig::default()).build().unwrap_err();
        assert!(err.to_string().contains("at least one provider"));
    }

    #[test]
    fn test_build_seeds_budgets_and_stats() {
        let gateway = GatewayBuilder::new(two_provider_config()).build().unwrap();

        let limiter = gateway.rate_limiter();
        assert_eq!(limiter.budget("local"), 2);
        assert_eq!(limiter.budget("remote"), 60);

        let usage = gateway.statistics().provider_usage;
        assert_eq!(usage.get("local"), Some(&0));
        assert_eq!(usage.get("remote"), Some(&0));

        let board = gateway.provider_status();
        assert_eq!(board.len(), 2);
        assert!(board.iter().all(|s| s.healthy));
    }
}
