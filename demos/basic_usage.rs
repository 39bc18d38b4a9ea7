//! Basic usage example
//!
//! Routes one chat completion through the gateway. Providers come from a
//! YAML file when `GATEWAY_CONFIG` points at one, otherwise from a small
//! built-in pair: a local llama.cpp server and OpenRouter as fallback.
//!
//! API keys are resolved per provider from `{NAME}_API_KEY`:
//! - OPENROUTER_API_KEY for the hosted fallback
//!
//! Usage:
//!   OPENROUTER_API_KEY="your_key" cargo run --example basic_usage

use std::env;

use llm_gateway::config::{GatewayConfig, ModelFormat, ProviderConfig};
use llm_gateway::types::{ChatMessage, CompletionRequest};
use llm_gateway::CompletionGateway;

fn built_in_config() -> GatewayConfig {
    let local = ProviderConfig::new(
        "local",
        "http://localhost:8080/v1",
        "llama-3.1-8b-instruct",
    );

    let mut openrouter = ProviderConfig::new(
        "openrouter",
        "https://openrouter.ai/api/v1",
        "meta-llama/llama-3.1-8b-instruct",
    );
    openrouter.model_format = ModelFormat::Namespaced;

    let mut config = GatewayConfig::default();
    config.providers = vec![local, openrouter];
    config
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    if env::var("OPENROUTER_API_KEY").is_err() {
        eprintln!("Warning: OPENROUTER_API_KEY not set. The fallback provider will reject requests.");
    }

    let config = match env::var("GATEWAY_CONFIG") {
        Ok(path) => GatewayConfig::from_yaml_file(path)?,
        Err(_) => built_in_config(),
    };
    let gateway = CompletionGateway::new(config)?;

    let request = CompletionRequest::new(vec![
        ChatMessage::system("You are a helpful assistant. Keep answers short."),
        ChatMessage::user("Explain what a completion gateway does in one sentence."),
    ])
    .with_temperature(0.7)
    .with_max_tokens(200);

    let response = gateway.complete(request).await?;

    println!("Response:\n{}", response.content().unwrap_or("<no content>"));
    if let Some(usage) = &response.usage {
        println!("\nTokens: {} prompt, {} completion", usage.prompt_tokens, usage.completion_tokens);
    }

    let stats = gateway.statistics();
    println!(
        "\nGateway stats: {} request(s), {} succeeded, {} failover(s)",
        stats.total_requests, stats.successful_requests, stats.failovers
    );

    Ok(())
}
