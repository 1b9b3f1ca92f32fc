//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): requests by method, status, kind
//! - `proxy_request_duration_seconds` (histogram): latency by kind
//! - `proxy_links_rewritten_total` (counter): hrefs made origin-relative
//! - `proxy_words_marked_total` (counter): words that received the mark
//!
//! Without an installed recorder every call here is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape endpoint on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one finished request.
pub fn record_request(method: &str, status: u16, kind: &'static str, start: Instant) {
    ::metrics::counter!(
        "proxy_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "kind" => kind
    )
    .increment(1);

    ::metrics::histogram!("proxy_request_duration_seconds", "kind" => kind)
        .record(start.elapsed().as_secs_f64());
}

/// Record the work done by one document transform.
pub fn record_transform(links_rewritten: usize, words_marked: usize) {
    ::metrics::counter!("proxy_links_rewritten_total").increment(links_rewritten as u64);
    ::metrics::counter!("proxy_words_marked_total").increment(words_marked as u64);
}
