//! Outbound response assembly and error mapping.
//!
//! # Responsibilities
//! - Turn a dispatched result into exactly one HTTP response
//! - Map fetch and transform failures to 5xx statuses
//!
//! # Design Decisions
//! - HTML responses always carry `text/html; charset=utf-8`
//! - Pass-through responses mirror the upstream content type and force nothing
//! - Error bodies are short plain text; no upstream bytes leak into them

use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use thiserror::Error;

use crate::transform::TransformError;
use crate::upstream::FetchError;

/// Content type of every transformed document.
pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// How the body of a response was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    /// Rewritten and reserialized HTML.
    Html,
    /// Upstream bytes forwarded untouched.
    Passthrough,
}

impl ResponseKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ResponseKind::Html => "html",
            ResponseKind::Passthrough => "passthrough",
        }
    }
}

/// A complete response ready to be written to the client.
#[derive(Debug, Clone)]
pub struct ProxyResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Bytes,
    pub kind: ResponseKind,
}

impl IntoResponse for ProxyResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        if let Some(value) = self
            .content_type
            .and_then(|ct| HeaderValue::from_str(&ct).ok())
        {
            response.headers_mut().insert(header::CONTENT_TYPE, value);
        }
        response
    }
}

/// Terminal failure of one proxied request.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Transform(#[from] TransformError),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::Fetch(FetchError::Timeout { .. }) => StatusCode::GATEWAY_TIMEOUT,
            ProxyError::Fetch(FetchError::Failed { .. }) => StatusCode::BAD_GATEWAY,
            ProxyError::Transform(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProxyError::Fetch(FetchError::Timeout { .. }) => "fetch_timeout",
            ProxyError::Fetch(FetchError::Failed { .. }) => "fetch_failed",
            ProxyError::Transform(TransformError::ParseFailed(_)) => "parse_failed",
            ProxyError::Transform(TransformError::Aborted(_)) => "transform_aborted",
        }
    }

    fn public_message(&self) -> &'static str {
        match self {
            ProxyError::Fetch(FetchError::Timeout { .. }) => "Upstream request timed out",
            ProxyError::Fetch(FetchError::Failed { .. }) => "Upstream request failed",
            ProxyError::Transform(_) => "Upstream document could not be transformed",
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (self.status(), self.public_message()).into_response()
    }
}
