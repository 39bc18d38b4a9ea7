//! Provider failover example
//!
//! The primary provider points at a port nothing listens on, so the first
//! attempt burns its retry budget and the gateway falls over to the next
//! candidate. Afterwards the per-provider status board and counters show
//! what happened.
//!
//! Usage:
//!   OPENROUTER_API_KEY="your_key" cargo run --example provider_failover

use std::env;

use llm_gateway::config::{GatewayConfig, ModelFormat, ProviderConfig};
use llm_gateway::types::{ChatMessage, CompletionRequest};
use llm_gateway::CompletionGateway;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    if env::var("OPENROUTER_API_KEY").is_err() {
        eprintln!("Warning: OPENROUTER_API_KEY not set. Both providers will fail.");
    }

    // Port 9 is the discard port; connecting to it fails immediately.
    let dead = ProviderConfig::new("dead-primary", "http://127.0.0.1:9/v1", "llama-3.1-8b-instruct");

    let mut openrouter = ProviderConfig::new(
        "openrouter",
        "https://openrouter.ai/api/v1",
        "meta-llama/llama-3.1-8b-instruct",
    );
    openrouter.model_format = ModelFormat::Namespaced;

    let mut config = GatewayConfig::default();
    config.providers = vec![dead, openrouter];
    // Keep the demo snappy; the dead primary still gets two attempts.
    config.retry.max_retries = 1;
    config.retry.base_delay_ms = 200;

    let gateway = CompletionGateway::new(config)?;

    let request = CompletionRequest::new(vec![
        ChatMessage::system("You are a helpful assistant. Keep answers short."),
        ChatMessage::user("Say hello."),
    ])
    .with_max_tokens(100);

    match gateway.complete(request).await {
        Ok(response) => {
            println!("Response:\n{}\n", response.content().unwrap_or("<no content>"));
        }
        Err(err) => println!("All providers failed: {err}\n"),
    }

    let stats = gateway.statistics();
    println!("Failovers: {}", stats.failovers);
    for (provider, served) in &stats.provider_usage {
        println!("  {provider}: {served} request(s) served");
    }

    println!("\nProvider status:");
    for status in gateway.provider_status() {
        if status.healthy {
            let latency = status
                .latency_ms
                .map(|ms| format!("{ms} ms"))
                .unwrap_or_else(|| "-".to_string());
            println!("  {:<14} healthy ({latency})", status.name);
        } else {
            println!(
                "  {:<14} unhealthy: {}",
                status.name,
                status.error.as_deref().unwrap_or("unknown")
            );
        }
    }

    println!("\nRunning a health check across all providers...");
    for status in gateway.health_check_all().await {
        println!(
            "  {:<14} {}",
            status.name,
            if status.healthy { "reachable" } else { "unreachable" }
        );
    }

    Ok(())
}
