//! Metrics collection and exposition.
//!
//! # Metrics
//! - `backchannel_rewrite_total` (counter): rewrite decisions by `outcome`
//!   (`rewritten`, `unchanged`, `skipped_oauth`, `malformed`)
//! - `backchannel_transport_requests_total` (counter): transport sends by
//!   `transport` and `result`
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Outcome of one rewrite decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteOutcome {
    Rewritten,
    Unchanged,
    SkippedOauth,
    Malformed,
}

impl RewriteOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            RewriteOutcome::Rewritten => "rewritten",
            RewriteOutcome::Unchanged => "unchanged",
            RewriteOutcome::SkippedOauth => "skipped_oauth",
            RewriteOutcome::Malformed => "malformed",
        }
    }
}

/// Install the Prometheus recorder and its HTTP scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_rewrite(outcome: RewriteOutcome) {
    metrics::counter!("backchannel_rewrite_total", "outcome" => outcome.as_str()).increment(1);
}

pub fn record_transport_result(transport: &'static str, result: &'static str) {
    metrics::counter!(
        "backchannel_transport_requests_total",
        "transport" => transport,
        "result" => result
    )
    .increment(1);
}
