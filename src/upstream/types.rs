//! Upstream response model and error definitions.

use axum::http::StatusCode;
use bytes::Bytes;
use thiserror::Error;

/// Body of an upstream response, already classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Decoded text of a `text/html` response.
    Html(String),
    /// Anything else, byte for byte.
    Binary(Bytes),
}

impl Payload {
    pub fn is_html(&self) -> bool {
        matches!(self, Payload::Html(_))
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        match self {
            Payload::Html(text) => text.len(),
            Payload::Binary(bytes) => bytes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_bytes(self) -> Bytes {
        match self {
            Payload::Html(text) => Bytes::from(text),
            Payload::Binary(bytes) => bytes,
        }
    }
}

/// One upstream response, consumed once by the dispatcher.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    /// Status as sent by the origin; not interpreted.
    pub status: StatusCode,
    /// Raw `Content-Type` header, if the origin sent one.
    pub content_type: Option<String>,
    pub payload: Payload,
}

impl UpstreamResponse {
    pub fn is_html(&self) -> bool {
        self.payload.is_html()
    }
}

/// Errors that can occur while reading from the origin.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The origin did not answer within the configured bound.
    #[error("upstream timeout after {after_ms} ms fetching {url}")]
    Timeout { url: String, after_ms: u64 },

    /// Connection or transport failure.
    #[error("upstream request to {url} failed: {source}")]
    Failed {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Result type for upstream operations.
pub type FetchResult<T> = Result<T, FetchError>;
