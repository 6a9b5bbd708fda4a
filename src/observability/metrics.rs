//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define router metrics (requests, latency, unresolved destinations)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `router_requests_total` (counter): requests by rule, destination, status
//! - `router_request_duration_seconds` (histogram): latency distribution
//! - `router_unresolved_destinations_total` (counter): matches skipped for a missing destination
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op
//! - Labels for rule, destination, status code

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Label used when no rule matched.
pub const NO_ROUTE: &str = "none";

/// Install the Prometheus recorder and its scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record a completed request.
pub fn record_request(rule: &str, destination: &str, status: u16, start: Instant) {
    let labels = [
        ("rule", rule.to_string()),
        ("destination", destination.to_string()),
        ("status", status.to_string()),
    ];
    metrics::counter!("router_requests_total", &labels).increment(1);
    metrics::histogram!("router_request_duration_seconds", &labels).record(start.elapsed().as_secs_f64());
}

/// Record a matched rule whose destination was not registered.
pub fn record_unresolved(rule: &str, destination: &str) {
    metrics::counter!(
        "router_unresolved_destinations_total",
        "rule" => rule.to_string(),
        "destination" => destination.to_string()
    )
    .increment(1);
}
