//! Metrics collection and exposition.
//!
//! # Metrics
//! - `grpc_config_resolutions_total` (counter): resolutions by registry, result (hit/miss)
//! - `grpc_config_mutations_total` (counter): registry mutations by registry, op
//! - `grpc_config_patterns` (gauge): registered patterns per registry
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op
//! - Prometheus exposition is opt-in and only used by the watch mode

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder with an HTTP scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, "Failed to install metrics exporter: {}", e),
    }
}

pub fn record_resolution(registry: &'static str, result: &'static str) {
    ::metrics::counter!("grpc_config_resolutions_total", "registry" => registry, "result" => result).increment(1);
}

pub fn record_mutation(registry: &'static str, op: &'static str) {
    ::metrics::counter!("grpc_config_mutations_total", "registry" => registry, "op" => op).increment(1);
}

pub fn record_pattern_count(registry: &'static str, count: usize) {
    ::metrics::gauge!("grpc_config_patterns", "registry" => registry).set(count as f64);
}
