//! Metrics collection and exposition.
//!
//! # Metrics
//! - `router_reloads_total` (counter): reloads by outcome (success, failure)
//! - `router_reload_duration_seconds` (histogram): full rebuild time
//! - `router_lookups_total` (counter): lookups by outcome
//!   (exact, wildcard, default, global, miss)
//! - `router_actions` (gauge): exact actions in the live snapshot
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed
//! - Prometheus exporter only when the binary asks for it

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::runtime::snapshot::LookupOutcome;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_reload(success: bool, started: Instant) {
    let outcome = if success { "success" } else { "failure" };
    metrics::counter!("router_reloads_total", "outcome" => outcome).increment(1);
    metrics::histogram!("router_reload_duration_seconds").record(started.elapsed().as_secs_f64());
}

pub fn record_lookup(outcome: LookupOutcome) {
    metrics::counter!("router_lookups_total", "outcome" => outcome.as_str()).increment(1);
}

pub fn record_snapshot_size(actions: usize) {
    metrics::gauge!("router_actions").set(actions as f64);
}
