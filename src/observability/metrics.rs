//! Metrics collection and exposition.
//!
//! # Metrics
//! - `ledger_client_requests_total` (counter): HTTP calls by path, status
//! - `ledger_client_request_duration_seconds` (histogram): HTTP call latency
//! - `ledger_client_sign_stages_total` (counter): signer stages by outcome
//! - `ledger_client_batch_items_total` (counter): batch items by result

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and serve it on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to start metrics endpoint"),
    }
}

/// Record one HTTP call. `status` is `None` when no response arrived.
pub fn record_request(path: &str, status: Option<u16>, start: Instant) {
    let status = status.map_or_else(|| "error".to_string(), |s| s.to_string());
    metrics::counter!(
        "ledger_client_requests_total",
        "path" => path.to_string(),
        "status" => status
    )
    .increment(1);
    metrics::histogram!("ledger_client_request_duration_seconds", "path" => path.to_string())
        .record(start.elapsed().as_secs_f64());
}

/// Record the outcome of one signer stage.
pub fn record_sign_stage(outcome: &'static str) {
    metrics::counter!("ledger_client_sign_stages_total", "outcome" => outcome).increment(1);
}

/// Record the classification of a finished batch.
pub fn record_batch_items(successes: usize, errors: usize) {
    metrics::counter!("ledger_client_batch_items_total", "result" => "success")
        .increment(successes as u64);
    metrics::counter!("ledger_client_batch_items_total", "result" => "error")
        .increment(errors as u64);
}
