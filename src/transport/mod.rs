//! # Transport Module
//!
//! Thin HTTP layer between the gateway and provider endpoints. Everything
//! above this module works with plain status codes and body text; transport
//! failures are split into the three shapes the retry engine cares about.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`Transport`] | Trait for outbound HTTP, implemented by fakes in tests |
//! | [`HttpTransport`] | Production implementation over a pooled reqwest client |
//! | [`RawResponse`] | Uninterpreted status code plus body text |
//! | [`TransportError`] | Timeout / connect / other transport failures |

pub mod http;

pub use http::HttpTransport;

use std::time::Duration;

use async_trait::async_trait;

/// Raw provider reply before any interpretation.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The request or response exceeded the configured deadline.
    #[error("request timeout")]
    Timeout,

    /// Failure below HTTP: DNS, TCP or TLS.
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Outbound HTTP operations the gateway needs.
///
/// Both calls take an optional per-request timeout so providers with
/// different deadlines can share one transport instance.
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST a JSON body and return the raw reply, whatever its status.
    async fn post_json(
        &self,
        url: &str,
        bearer: Option<&str>,
        body: &serde_json::Value,
        timeout: Option<Duration>,
    ) -> Result<RawResponse, TransportError>;

    async fn get(
        &self,
        url: &str,
        bearer: Option<&str>,
        timeout: Option<Duration>,
    ) -> Result<RawResponse, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_covers_2xx_only() {
        let ok = RawResponse { status: 204, body: String::new() };
        assert!(ok.is_success());

        let redirect = RawResponse { status: 301, body: String::new() };
        assert!(!redirect.is_success());

        let client_err = RawResponse { status: 404, body: String::new() };
        assert!(!client_err.is_success());
    }
}
