//! Metrics collection and exposition.
//!
//! # Metrics
//! - `sampling_strategy_reloads_total` (counter): reload attempts by `outcome`
//! - `sampling_strategy_services` (gauge): services in the published snapshot
//!
//! Only the reload path records metrics; strategy lookups stay untouched.

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with an HTTP listener on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Count one reload attempt.
pub fn record_reload(outcome: &'static str) {
    metrics::counter!("sampling_strategy_reloads_total", "outcome" => outcome).increment(1);
}

/// Record the size of a newly published snapshot.
pub fn record_snapshot_services(count: usize) {
    metrics::gauge!("sampling_strategy_services").set(count as f64);
}
