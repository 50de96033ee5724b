//! Metrics collection and exposition.
//!
//! # Metrics
//! - `reporting_requests_total` (counter): inbound `/reporting` calls by status
//! - `reporting_request_duration_seconds` (histogram): inbound latency
//! - `reporting_dispatch_attempts_total` (counter): upstream attempts by outcome
//! - `reporting_rate_limited_total` (counter): local admission rejections by instance
//! - `reporting_breaker_transitions_total` (counter): breaker state changes by instance
//!
//! Without an installed recorder every call here is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one inbound reporting request.
pub fn record_request(status: u16, start: Instant) {
    let status = status.to_string();
    metrics::counter!("reporting_requests_total", "status" => status.clone()).increment(1);
    metrics::histogram!("reporting_request_duration_seconds", "status" => status)
        .record(start.elapsed().as_secs_f64());
}

/// Record the outcome of one dispatch attempt.
pub fn record_dispatch_attempt(outcome: &'static str) {
    metrics::counter!("reporting_dispatch_attempts_total", "outcome" => outcome).increment(1);
}

pub fn record_rate_limited(instance: &str) {
    metrics::counter!("reporting_rate_limited_total", "instance" => instance.to_string()).increment(1);
}

pub fn record_breaker_transition(instance: &str, to: &'static str) {
    metrics::counter!(
        "reporting_breaker_transitions_total",
        "instance" => instance.to_string(),
        "to" => to
    )
    .increment(1);
}
