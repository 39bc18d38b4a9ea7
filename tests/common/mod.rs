//! Shared test doubles for gateway integration tests.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use llm_gateway::transport::{RawResponse, Transport, TransportError};

/// One scripted outcome for a URL.
#[derive(Debug, Clone)]
pub enum Script {
    Reply(u16, String),
    Timeout,
    ConnectFailure,
}

/// A call observed by the fake, in arrival order.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: &'static str,
    pub url: String,
    pub body: Option<serde_json::Value>,
    pub bearer: Option<String>,
}

/// Scripted in-memory transport.
///
/// Outcomes are queued per URL and consumed one per call; running out of
/// script is a test bug and panics with the offending URL.
#[derive(Default)]
pub struct FakeTransport {
    scripts: Mutex<HashMap<String, VecDeque<Script>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, url: &str, script: Script) {
        self.scripts
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .push_back(script);
    }

    pub fn push_reply(&self, url: &str, status: u16, body: &str) {
        self.push(url, Script::Reply(status, body.to_string()));
    }

    pub fn push_timeouts(&self, url: &str, count: usize) {
        for _ in 0..count {
            self.push(url, Script::Timeout);
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, url: &str) -> Vec<RecordedCall> {
        self.calls().into_iter().filter(|c| c.url == url).collect()
    }

    fn record(&self, call: RecordedCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn take(&self, url: &str) -> Script {
        let mut scripts = self.scripts.lock().unwrap();
        scripts
            .get_mut(url)
            .and_then(|queue| queue.pop_front())
            .unwrap_or_else(|| panic!("no scripted reply left for {url}"))
    }

    fn play(&self, script: Script) -> Result<RawResponse, TransportError> {
        match script {
            Script::Reply(status, body) => Ok(RawResponse { status, body }),
            Script::Timeout => Err(TransportError::Timeout),
            Script::ConnectFailure => {
                Err(TransportError::Connect("connection refused".to_string()))
            }
        }
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn post_json(
        &self,
        url: &str,
        bearer: Option<&str>,
        body: &serde_json::Value,
        _timeout: Option<Duration>,
    ) -> Result<RawResponse, TransportError> {
        self.record(RecordedCall {
            method: "POST",
            url: url.to_string(),
            body: Some(body.clone()),
            bearer: bearer.map(str::to_string),
        });
        let script = self.take(url);
        self.play(script)
    }

    async fn get(
        &self,
        url: &str,
        bearer: Option<&str>,
        _timeout: Option<Duration>,
    ) -> Result<RawResponse, TransportError> {
        self.record(RecordedCall {
            method: "GET",
            url: url.to_string(),
            body: None,
            bearer: bearer.map(str::to_string),
        });
        let script = self.take(url);
        self.play(script)
    }
}

/// Minimal successful completion body with the given assistant text.
pub fn ok_body(text: &str) -> String {
    serde_json::json!({
        "id": "chatcmpl-test",
        "model": "test-model",
        "choices": [
            {
                "index": 0,
                "message": { "role": "assistant", "content": text },
                "finish_reason": "stop"
            }
        ],
        "usage": { "prompt_tokens": 1, "completion_tokens": 1, "total_tokens": 2 }
    })
    .to_string()
}

/// Body with a provider-level error embedded in an HTTP 200 reply.
pub fn error_body(message: &str) -> String {
    serde_json::json!({ "error": message }).to_string()
}

pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
