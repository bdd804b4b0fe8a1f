//! Metrics collection and exposition.
//!
//! # Metrics
//! - `catalog_errors_total` (counter): counted failures by kind
//! - `catalog_operations_total` (counter): catalog operations by name, outcome
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op
//! - Prometheus exposition is optional and runs on its own listener

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::observability::errors::ErrorKind;

/// Install the Prometheus recorder and start its HTTP listener.
///
/// Must be called from inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_error(kind: ErrorKind) {
    metrics::counter!("catalog_errors_total", "kind" => kind.as_str()).increment(1);
}

pub fn record_operation(operation: &'static str, outcome: &'static str) {
    metrics::counter!(
        "catalog_operations_total",
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);
}
