//! # llm-gateway
//!
//! A multi-provider AI completion gateway: one chat request in, a usable
//! completion out, regardless of which configured backend was willing to
//! serve it.
//!
//! ## Overview
//!
//! The gateway accepts a [`CompletionRequest`] and routes it across any
//! number of OpenAI-compatible providers in priority order. Each provider
//! attempt carries its own retry budget with exponential backoff; terminal
//! failures advance to the next candidate. Conversations are sanitized and
//! trimmed to a token budget before dispatch without ever breaking a
//! tool-call exchange, and outbound traffic passes a sliding-window rate
//! limiter that callers can share with their own dispatch code.
//!
//! ## Key Features
//!
//! - **Failover routing**: ordered provider attempts, a preferred provider
//!   moves to the front, disabled providers are skipped entirely
//! - **Retry engine**: per-provider backoff tuned to the failure class
//!   (remote rate limits, server errors, timeouts, connection failures)
//! - **Content-policy recovery**: bounded secondary attempts when the
//!   primary refuses on content grounds
//! - **Conversation shaping**: sanitizing and newest-first trimming that
//!   preserves system prompts and tool-call pairs
//! - **Health probes**: on-demand provider status for diagnostics, kept
//!   out of the routing path
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use llm_gateway::{ChatMessage, CompletionGateway, CompletionRequest, GatewayConfig};
//!
//! #[tokio::main]
//! async fn main() -> llm_gateway::Result<()> {
//!     let config = GatewayConfig::from_yaml_file("gateway.yaml")?;
//!     let gateway = CompletionGateway::new(config)?;
//!
//!     let request = CompletionRequest::new(vec![
//!         ChatMessage::user("Why is the sky blue?"),
//!     ]);
//!
//!     let response = gateway.complete(request).await?;
//!     println!("{}", response.content().unwrap_or_default());
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`gateway`] | Routing, failover, retries, health probes, statistics |
//! | [`prepare`] | Message sanitizing and token-budget trimming |
//! | [`resilience`] | Sliding-window rate limiting and backoff policies |
//! | [`transport`] | HTTP transport trait and its reqwest implementation |
//! | [`types`] | Requests, messages, tools and responses |
//! | [`config`] | YAML-loadable gateway and provider configuration |

pub mod config;
pub mod gateway;
pub mod prepare;
pub mod resilience;
pub mod transport;
pub mod types;

// Re-export main types for convenience
pub use config::{GatewayConfig, ModelFormat, ProviderConfig};
pub use gateway::{CompletionGateway, GatewayBuilder, ProviderStatus, StatsSnapshot};
pub use types::{
    ChatMessage, CompletionRequest, CompletionResponse, Role, ToolCall, ToolChoice, ToolSpec,
};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::Error;
