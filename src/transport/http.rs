use std::time::Duration;

use async_trait::async_trait;

use super::{RawResponse, Transport, TransportError};

/// Production transport backed by a pooled [`reqwest::Client`].
///
/// The constructor timeout is the client-wide ceiling; callers supply
/// per-request deadlines that override it.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Some(Duration::from_secs(90)))
            .build()?;
        Ok(Self { client })
    }
}

/// Connect timeouts set both flags; the timeout check must come first.
fn classify(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::Connect(err.to_string())
    } else {
        TransportError::Http(err)
    }
}

async fn read(response: reqwest::Response) -> Result<RawResponse, TransportError> {
    let status = response.status().as_u16();
    let body = response.text().await.map_err(classify)?;
    Ok(RawResponse { status, body })
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_json(
        &self,
        url: &str,
        bearer: Option<&str>,
        body: &serde_json::Value,
        timeout: Option<Duration>,
    ) -> Result<RawResponse, TransportError> {
        let mut request = self.client.post(url).json(body);
        if let Some(deadline) = timeout {
            request = request.timeout(deadline);
        }
        if let Some(key) = bearer {
            request = request.bearer_auth(key);
        }
        let response = request.send().await.map_err(classify)?;
        read(response).await
    }

    async fn get(
        &self,
        url: &str,
        bearer: Option<&str>,
        timeout: Option<Duration>,
    ) -> Result<RawResponse, TransportError> {
        let mut request = self.client.get(url);
        if let Some(deadline) = timeout {
            request = request.timeout(deadline);
        }
        if let Some(key) = bearer {
            request = request.bearer_auth(key);
        }
        let response = request.send().await.map_err(classify)?;
        read(response).await
    }
}
