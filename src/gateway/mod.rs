//! # Gateway Module
//!
//! The completion gateway proper: provider routing with failover,
//! per-provider retries, content-policy recovery, health probing and
//! traffic statistics.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`CompletionGateway`] | Routes requests across providers in order |
//! | [`GatewayBuilder`] | Assembly with injectable collaborators |
//! | [`ProviderClient`] | One provider plus its retry engine |
//! | [`ErrorClassifier`] | Maps provider errors to routing dispositions |
//! | [`GatewayStats`] | Shared traffic counters |
//! | [`StatusBoard`] | Last known health per provider |
//!
//! ## Example
//!
//! ```rust,no_run
//! use llm_gateway::config::GatewayConfig;
//! use llm_gateway::gateway::CompletionGateway;
//! use llm_gateway::types::{ChatMessage, CompletionRequest};
//!
//! # async fn run() -> llm_gateway::Result<()> {
//! let config = GatewayConfig::from_yaml_file("gateway.yaml")?;
//! let gateway = CompletionGateway::new(config)?;
//!
//! let request = CompletionRequest::new(vec![
//!     ChatMessage::system("You are a concise assistant."),
//!     ChatMessage::user("What is the capital of France?"),
//! ]);
//! let response = gateway.complete(request).await?;
//! println!("{}", response.content().unwrap_or_default());
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod classify;
pub mod core;
pub mod health;
pub mod provider;
mod route;
pub mod stats;

pub use builder::GatewayBuilder;
pub use classify::{Disposition, ErrorClassifier};
pub use core::CompletionGateway;
pub use health::{ProviderStatus, StatusBoard};
pub use provider::ProviderClient;
pub use stats::{GatewayStats, StatsSnapshot};
