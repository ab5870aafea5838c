//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): requests by outcome, status
//! - `proxy_request_duration_seconds` (histogram): latency by outcome
//! - `proxy_upstream_fetches_total` (counter): upstream GETs by kind
//! - `proxy_stylesheets_total` (counter): inlining results
//!
//! # Design Decisions
//! - Calls are no-ops until a recorder is installed
//! - Labels are low-cardinality (no URLs, no bot ids)

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record a finished request.
pub fn record_request(outcome: &'static str, status: u16, start: Instant) {
    metrics::counter!(
        "proxy_requests_total",
        "outcome" => outcome,
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("proxy_request_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}

/// Record an upstream GET (`target` or `reference`).
pub fn record_upstream_fetch(kind: &'static str) {
    metrics::counter!("proxy_upstream_fetches_total", "kind" => kind).increment(1);
}

/// Record a stylesheet inlining result (`rewritten` or `refused`).
pub fn record_stylesheet(result: &'static str) {
    metrics::counter!("proxy_stylesheets_total", "result" => result).increment(1);
}
