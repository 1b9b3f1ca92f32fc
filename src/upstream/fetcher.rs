//! Bounded-time reads from the origin.
//!
//! # Responsibilities
//! - Build `origin + path` and issue a single GET
//! - Enforce the upstream deadline over connect, headers and body
//! - Classify the response as HTML text or opaque bytes

use std::time::Duration;

use axum::http::header;
use reqwest::Client;

use crate::config::UpstreamConfig;
use crate::upstream::types::{FetchError, FetchResult, Payload, UpstreamResponse};

/// Fetches pages from the configured origin.
///
/// Cloning is cheap: the underlying `reqwest::Client` shares its
/// connection pool between clones.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    origin: String,
    timeout: Duration,
}

impl Fetcher {
    /// Build a fetcher with its own connection pool.
    pub fn new(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        let timeout = Duration::from_millis(config.timeout_ms);
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self::with_client(client, config))
    }

    /// Build a fetcher around an existing client.
    pub fn with_client(client: Client, config: &UpstreamConfig) -> Self {
        Self {
            client,
            origin: config.origin.clone(),
            timeout: Duration::from_millis(config.timeout_ms),
        }
    }

    /// The origin every path is appended to.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Read `origin + path`. `path` is forwarded verbatim, query included.
    pub async fn fetch(&self, path: &str) -> FetchResult<UpstreamResponse> {
        let url = format!("{}{}", self.origin, path);
        tracing::debug!(url = %url, "Fetching upstream");

        // The client deadline already covers the whole exchange; the outer
        // bound also catches a body that trickles in after the headers.
        match tokio::time::timeout(self.timeout, self.read(&url)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout {
                url,
                after_ms: self.timeout.as_millis() as u64,
            }),
        }
    }

    async fn read(&self, url: &str) -> FetchResult<UpstreamResponse> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.classify_error(url, e))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        let payload = if content_type.as_deref().is_some_and(is_html_content_type) {
            let text = response
                .text()
                .await
                .map_err(|e| self.classify_error(url, e))?;
            Payload::Html(text)
        } else {
            let bytes = response
                .bytes()
                .await
                .map_err(|e| self.classify_error(url, e))?;
            Payload::Binary(bytes)
        };

        tracing::debug!(
            url = %url,
            status = status.as_u16(),
            html = payload.is_html(),
            bytes = payload.len(),
            "Upstream responded"
        );

        Ok(UpstreamResponse {
            status,
            content_type,
            payload,
        })
    }

    fn classify_error(&self, url: &str, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
                after_ms: self.timeout.as_millis() as u64,
            }
        } else {
            FetchError::Failed {
                url: url.to_string(),
                source: error,
            }
        }
    }
}

/// Whether a `Content-Type` value announces HTML.
pub fn is_html_content_type(value: &str) -> bool {
    value.to_ascii_lowercase().contains("text/html")
}
