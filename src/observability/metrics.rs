//! Metrics collection and exposition.
//!
//! # Metrics
//! - `roots_resolutions_total` (counter): resolutions by outcome
//! - `roots_cache_lookups_total` (counter): existence cache lookups by result
//! - `roots_fallbacks_total` (counter): auto-pattern fallbacks to the shared dir
//! - `roots_cache_entries` (gauge): memoized directory paths

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with an HTTP listener on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_resolution(outcome: &'static str) {
    counter!("roots_resolutions_total", "outcome" => outcome).increment(1);
}

pub fn record_cache_lookup(hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    counter!("roots_cache_lookups_total", "result" => result).increment(1);
}

pub fn record_cache_size(entries: usize) {
    gauge!("roots_cache_entries").set(entries as f64);
}

pub fn record_fallback() {
    counter!("roots_fallbacks_total").increment(1);
}
