use crate::transport::TransportError;
use thiserror::Error;

/// Unified error type for the gateway.
///
/// Each variant corresponds to one class of failure the router has to act
/// on: some are retried inside a single provider attempt, some advance the
/// failover sequence, and some stop routing entirely. The mapping lives in
/// [`crate::gateway::ErrorClassifier`]; this enum only carries the facts.
#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// No enabled provider was available to attempt.
    #[error("no providers available")]
    NoProviders,

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Transport failure that is not worth retrying (TLS setup, malformed
    /// URL, response decoding and the like). Timeouts and connection
    /// failures are classified by the retry engine before they reach here.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// HTTP 401 from a provider. Fatal for that provider, but the router
    /// may still succeed with a different provider's credentials.
    #[error("{provider}: invalid API key")]
    Authentication { provider: String },

    /// Denied by the local rate limiter before any network call.
    #[error("rate limit exceeded for {operation}, try again shortly")]
    RateLimitedLocal { operation: String },

    /// HTTP 429 that survived the retry budget.
    #[error("{provider}: rate limited by remote service")]
    RateLimitedRemote { provider: String },

    /// Request timed out on every attempt.
    #[error("{provider}: request timed out")]
    Timeout { provider: String },

    /// Could not establish a connection on any attempt.
    #[error("{provider}: connection failed: {message}")]
    Connection { provider: String, message: String },

    /// Non-success HTTP status, either non-retryable (4xx) or a 5xx that
    /// survived the retry budget. `message` holds a truncated body.
    #[error("{provider}: HTTP {status}: {message}")]
    Http {
        provider: String,
        status: u16,
        message: String,
    },

    /// Provider-level error embedded in an HTTP 200 body.
    #[error("{provider}: {message}")]
    Provider {
        provider: String,
        message: String,
        /// Explicit flag from the response body; overrides text matching.
        unrecoverable: bool,
    },
}

impl Error {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Error::Configuration {
            message: msg.into(),
        }
    }

    /// Name of the provider this error is attributed to, when there is one.
    pub fn provider(&self) -> Option<&str> {
        match self {
            Error::Authentication { provider }
            | Error::RateLimitedRemote { provider }
            | Error::Timeout { provider }
            | Error::Connection { provider, .. }
            | Error::Http { provider, .. }
            | Error::Provider { provider, .. } => Some(provider),
            _ => None,
        }
    }

    /// True when the local rate limiter produced this error, so callers can
    /// tell "try again shortly" apart from a payload defect.
    pub fn is_locally_rate_limited(&self) -> bool {
        matches!(self, Error::RateLimitedLocal { .. })
    }
}
