//! Metrics collection and exposition.
//!
//! # Metrics
//! - `forwarder_requests_total` (counter): requests by route and outcome
//! - `forwarder_upstream_duration_seconds` (histogram): outbound GET latency
//!
//! Recording is a no-op until `init_metrics` installs the exporter.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape listener on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Count one handled request.
pub fn record_request(route: &'static str, outcome: &'static str) {
    metrics::counter!("forwarder_requests_total", "route" => route, "outcome" => outcome)
        .increment(1);
}

/// Record how long the outbound call for `route` took.
pub fn record_upstream_latency(route: &'static str, start: Instant) {
    metrics::histogram!("forwarder_upstream_duration_seconds", "route" => route)
        .record(start.elapsed().as_secs_f64());
}
