//! Application metrics for Prometheus monitoring.
//!
//! This module provides:
//! - Prometheus metrics recorder initialization
//! - Metric definitions for the query endpoints and the live channel
//! - Helper functions for recording metrics

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Instant;

/// Global Prometheus handle for rendering metrics.
static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize the Prometheus metrics recorder.
///
/// Call once at startup, before any metrics are recorded.
/// Returns `true` if initialization succeeded, `false` if already initialized.
pub fn init_metrics() -> bool {
    if PROMETHEUS_HANDLE.get().is_some() {
        return false;
    }

    let recorder = PrometheusBuilder::new().build_recorder();
    let handle = recorder.handle();

    if metrics::set_global_recorder(recorder).is_err() {
        tracing::warn!("Failed to set global metrics recorder (already set)");
        return false;
    }

    if PROMETHEUS_HANDLE.set(handle).is_err() {
        tracing::warn!("Failed to store Prometheus handle (already set)");
    }

    describe_metrics();

    tracing::info!("Prometheus metrics initialized");
    true
}

fn describe_metrics() {
    describe_counter!("api_requests_total", "Total number of API requests by endpoint and status");
    describe_histogram!("api_request_duration_seconds", "Duration of API requests in seconds");

    describe_gauge!("live_sessions_active", "Number of open live WebSocket sessions");
    describe_counter!("live_snapshots_pushed_total", "Snapshots pushed to live clients");
    describe_histogram!("live_snapshot_features", "Number of features in each pushed live snapshot");
    describe_counter!(
        "live_snapshots_degraded_total",
        "Live cycles that fell back to an empty snapshot after a repository error"
    );
    describe_counter!(
        "live_client_messages_rejected_total",
        "Malformed or unsupported messages received on the live channel"
    );
}

/// Render current metrics in Prometheus text format.
///
/// Returns `None` if metrics are not initialized.
pub fn render_metrics() -> Option<String> {
    PROMETHEUS_HANDLE.get().map(|h| h.render())
}

/// Record a completed API request.
pub fn record_request(endpoint: &str, status: &str, duration: std::time::Duration) {
    counter!("api_requests_total", "endpoint" => endpoint.to_string(), "status" => status.to_string())
        .increment(1);
    histogram!("api_request_duration_seconds", "endpoint" => endpoint.to_string())
        .record(duration.as_secs_f64());
}

pub fn record_session_opened() {
    gauge!("live_sessions_active").increment(1.0);
}

pub fn record_session_closed() {
    gauge!("live_sessions_active").decrement(1.0);
}

pub fn record_snapshot_pushed(features: usize) {
    counter!("live_snapshots_pushed_total").increment(1);
    histogram!("live_snapshot_features").record(features as f64);
}

pub fn record_snapshot_degraded() {
    counter!("live_snapshots_degraded_total").increment(1);
}

pub fn record_client_message_rejected() {
    counter!("live_client_messages_rejected_total").increment(1);
}

/// Helper for timing request handlers.
///
/// Usage:
/// ```ignore
/// let timer = RequestTimer::new("vehicles");
/// // ... do work ...
/// timer.finish_ok(); // or timer.finish_err(status_code)
/// ```
pub struct RequestTimer {
    endpoint: &'static str,
    start: Instant,
}

impl RequestTimer {
    pub fn new(endpoint: &'static str) -> Self {
        Self {
            endpoint,
            start: Instant::now(),
        }
    }

    pub fn finish_ok(self) {
        record_request(self.endpoint, "200", self.start.elapsed());
    }

    pub fn finish_err(self, status: u16) {
        record_request(self.endpoint, &status.to_string(), self.start.elapsed());
    }

    /// Record according to a handler's result.
    pub fn finish_result<T>(self, result: &crate::ApiResult<T>) {
        match result {
            Ok(_) => self.finish_ok(),
            Err(e) => self.finish_err(e.status().as_u16()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_timer() {
        // Recording without an installed recorder is a no-op
        let timer = RequestTimer::new("test_endpoint");
        timer.finish_ok();
        RequestTimer::new("test_endpoint").finish_err(500);
    }

    #[test]
    fn test_live_helpers_without_recorder() {
        record_session_opened();
        record_snapshot_pushed(3);
        record_snapshot_degraded();
        record_client_message_rejected();
        record_session_closed();
    }
}
