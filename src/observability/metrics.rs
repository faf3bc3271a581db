//! Metrics collection and exposition.
//!
//! # Metrics
//! - `alert_router_requests_total` (counter): preview requests by operation and outcome
//! - `alert_router_request_duration_seconds` (histogram): latency by operation and outcome
//! - `alert_router_instances_total` (counter): instances evaluated
//! - `alert_router_matched_routes_total` (counter): route hits produced
//! - `alert_router_policy_reloads_total` (counter): reloads by outcome
//! - `alert_router_policy_routes` (gauge): routes in the live policy tree
//!
//! Recording without an installed exporter is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one preview request, whether it succeeded or not.
pub fn record_request(operation: &'static str, success: bool, start: Instant) {
    let outcome = outcome(success);
    ::metrics::counter!("alert_router_requests_total", "operation" => operation, "outcome" => outcome)
        .increment(1);
    ::metrics::histogram!("alert_router_request_duration_seconds", "operation" => operation, "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}

fn outcome(success: bool) -> &'static str {
    if success {
        "success"
    } else {
        "failure"
    }
}

/// Record instances evaluated and the route hits they produced.
pub fn record_matches(instances: usize, matched_routes: usize) {
    ::metrics::counter!("alert_router_instances_total").increment(instances as u64);
    ::metrics::counter!("alert_router_matched_routes_total").increment(matched_routes as u64);
}

/// Record a policy reload attempt.
pub fn record_policy_reload(success: bool) {
    ::metrics::counter!("alert_router_policy_reloads_total", "outcome" => outcome(success)).increment(1);
}

/// Record the size of the live policy tree.
pub fn record_policy_routes(count: usize) {
    ::metrics::gauge!("alert_router_policy_routes").set(count as f64);
}
