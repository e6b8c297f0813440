//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gate_requests_total` (counter): requests by method, status
//! - `gate_request_duration_seconds` (histogram): latency distribution
//! - `gate_auth_challenges_total` (counter): 401s issued by the pipeline
//! - `gate_rate_limited_total` (counter): denials by scope
//! - `gate_audit_failures_total` (counter): dropped or rejected audit writes
//!
//! # Design Decisions
//! - Low-overhead updates (atomic increments)
//! - The Prometheus listener binds off the request path

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Installs the Prometheus exporter on `addr`. Failure is logged and the
/// process keeps running without exposition.
pub fn init_metrics(addr: SocketAddr) {
    if let Err(error) = PrometheusBuilder::new().with_http_listener(addr).install() {
        tracing::error!(error = %error, "Failed to start metrics exporter");
    }
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    metrics::counter!(
        "gate_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
    )
    .increment(1);
    metrics::histogram!("gate_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_auth_challenge() {
    metrics::counter!("gate_auth_challenges_total").increment(1);
}

pub fn record_rate_limited(scope: &'static str) {
    metrics::counter!("gate_rate_limited_total", "scope" => scope).increment(1);
}

pub fn record_audit_failure() {
    metrics::counter!("gate_audit_failures_total").increment(1);
}
