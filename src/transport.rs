//! Outbound HTTP, kept behind a trait so adapters never touch the client.

use crate::config::DEFAULT_TIMEOUT;
use crate::error::{ProviderError, ProviderResult};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// A GET request with its query parameters and headers kept separate from the
/// URL so tests can assert on them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn query(mut self, name: &str, value: impl ToString) -> Self {
        self.query.push((name.to_string(), value.to_string()));
        self
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform the request. Non-2xx statuses are returned, not raised; only
    /// connection-level failures are errors.
    async fn get(&self, request: HttpRequest) -> ProviderResult<HttpResponse>;
}

/// `reqwest`-backed transport shared by all adapters.
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> ProviderResult<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> ProviderResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("wallsource/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ProviderError::Transport {
                url: String::new(),
                message: format!("Failed to build reqwest client: {}", e),
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, request: HttpRequest) -> ProviderResult<HttpResponse> {
        let mut req = self.client.get(&request.url).query(&request.query);
        for (name, value) in &request.headers {
            req = req.header(name.as_str(), value.as_str());
        }

        let transport_error = |e: reqwest::Error| ProviderError::Transport {
            url: request.url.clone(),
            message: e.to_string(),
        };

        let resp = req.send().await.map_err(transport_error)?;
        let status = resp.status().as_u16();
        let body = resp.text().await.map_err(transport_error)?;

        Ok(HttpResponse { status, body })
    }
}
