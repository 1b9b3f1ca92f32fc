//! Request dispatch: fetch, branch on content type, respond.
//!
//! Every request walks the same two steps in order: fetch from the origin,
//! then build the response. HTML goes through the document pipeline;
//! everything else is returned as the origin sent it.

use std::sync::Arc;

use bytes::Bytes;

use crate::config::ProxyConfig;
use crate::http::response::{ProxyError, ProxyResponse, ResponseKind, HTML_CONTENT_TYPE};
use crate::lifecycle::StartupError;
use crate::observability::metrics;
use crate::transform::{DocumentPipeline, TransformError};
use crate::upstream::{Fetcher, Payload};

/// Maps inbound paths to transformed or pass-through responses.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    fetcher: Fetcher,
    pipeline: Arc<DocumentPipeline>,
}

impl Dispatcher {
    pub fn new(fetcher: Fetcher, pipeline: DocumentPipeline) -> Self {
        Self {
            fetcher,
            pipeline: Arc::new(pipeline),
        }
    }

    /// Build the fetcher and pipeline described by `config`.
    pub fn from_config(config: &ProxyConfig) -> Result<Self, StartupError> {
        let fetcher = Fetcher::new(&config.upstream)?;
        let pipeline = DocumentPipeline::new(&config.upstream.origin, &config.transform)?;
        Ok(Self::new(fetcher, pipeline))
    }

    pub fn origin(&self) -> &str {
        self.fetcher.origin()
    }

    /// Proxy one request. `path` is the inbound path and query, verbatim.
    pub async fn dispatch(&self, path: &str) -> Result<ProxyResponse, ProxyError> {
        let upstream = self.fetcher.fetch(path).await?;

        match upstream.payload {
            Payload::Html(text) => {
                // CPU bound: parse and serialize run off the async workers.
                let pipeline = Arc::clone(&self.pipeline);
                let rendered = tokio::task::spawn_blocking(move || pipeline.run(&text))
                    .await
                    .map_err(|e| TransformError::Aborted(e.to_string()))??;
                metrics::record_transform(rendered.links_rewritten, rendered.words_marked);
                Ok(ProxyResponse {
                    status: upstream.status,
                    content_type: Some(HTML_CONTENT_TYPE.to_string()),
                    body: Bytes::from(rendered.html),
                    kind: ResponseKind::Html,
                })
            }
            Payload::Binary(body) => Ok(ProxyResponse {
                status: upstream.status,
                content_type: upstream.content_type,
                body,
                kind: ResponseKind::Passthrough,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use std::time::Duration;
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn dispatcher_for(server: &MockServer) -> Dispatcher {
        let mut config = ProxyConfig::default();
        config.upstream.origin = server.uri();
        config.upstream.timeout_ms = 500;
        Dispatcher::from_config(&config).unwrap()
    }

    #[tokio::test]
    async fn test_html_is_transformed() {
        let server = MockServer::start().await;
        let page = format!(
            r#"<html><body><p>banana orange kiwi</p><a href="{}/post/123">x</a></body></html>"#,
            server.uri()
        );
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(page, "text/html"))
            .mount(&server)
            .await;

        let response = dispatcher_for(&server).dispatch("/").await.unwrap();
        let body = String::from_utf8(response.body.to_vec()).unwrap();

        assert_eq!(response.kind, ResponseKind::Html);
        assert_eq!(response.content_type.as_deref(), Some(HTML_CONTENT_TYPE));
        assert!(body.contains("banana™ orange™ kiwi"));
        assert!(body.contains(r#"<a href="/post/123">"#));
    }

    #[tokio::test]
    async fn test_binary_passes_through() {
        let server = MockServer::start().await;
        let bytes: Vec<u8> = (0u8..=255).collect();
        Mock::given(method("GET"))
            .and(path("/blob"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "application/octet-stream")
                    .set_body_bytes(bytes.clone()),
            )
            .mount(&server)
            .await;

        let response = dispatcher_for(&server).dispatch("/blob").await.unwrap();
        assert_eq!(response.kind, ResponseKind::Passthrough);
        assert_eq!(response.body.as_ref(), bytes.as_slice());
        assert_eq!(
            response.content_type.as_deref(),
            Some("application/octet-stream")
        );
    }

    #[tokio::test]
    async fn test_html_error_page_keeps_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(503).set_body_raw("<p>Server down</p>", "text/html"),
            )
            .mount(&server)
            .await;

        let response = dispatcher_for(&server).dispatch("/").await.unwrap();
        assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.kind, ResponseKind::Html);
    }

    #[tokio::test]
    async fn test_timeout_yields_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("<p>late</p>", "text/html")
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let err = dispatcher_for(&server).dispatch("/").await.unwrap_err();
        assert_eq!(err.kind(), "fetch_timeout");
        assert_eq!(err.status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[tokio::test]
    async fn test_parse_failure_yields_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw("<div>".repeat(64), "text/html"),
            )
            .mount(&server)
            .await;

        let mut config = ProxyConfig::default();
        config.upstream.origin = server.uri();
        config.transform.max_nesting_depth = 16;
        let dispatcher = Dispatcher::from_config(&config).unwrap();

        let err = dispatcher.dispatch("/").await.unwrap_err();
        assert_eq!(err.kind(), "parse_failed");
        assert!(err.status().is_server_error());
    }
}
