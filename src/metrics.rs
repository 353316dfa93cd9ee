// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Metrics instrumentation for the Apollo client.
//!
//! Uses the `metrics` crate for backend-agnostic metrics collection.
//! The host process is responsible for choosing the exporter (Prometheus, OTEL, etc.)
//!
//! # Metric Naming Convention
//! - `apollo_client_` prefix for all metrics
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//! - `_bytes` suffix for size histograms
//!
//! # Labels
//! - `kind`: incremental, full
//! - `operation`: notifications, configs, snapshot
//! - `outcome`: written, no_change, empty, failed, updated, unchanged

use metrics::{counter, gauge, histogram};
use std::time::{Duration, Instant};

/// Record a finished cycle
pub fn record_cycle(kind: &str, outcome: &str) {
    counter!(
        "apollo_client_cycles_total",
        "kind" => kind.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// Record cycle duration
pub fn record_cycle_duration(kind: &str, duration: Duration) {
    histogram!(
        "apollo_client_cycle_seconds",
        "kind" => kind.to_string()
    )
    .record(duration.as_secs_f64());
}

/// Record request latency against the config service
pub fn record_latency(operation: &str, duration: Duration) {
    histogram!(
        "apollo_client_request_seconds",
        "operation" => operation.to_string()
    )
    .record(duration.as_secs_f64());
}

/// Record the number of namespaces reported as changed
pub fn record_changed_namespaces(count: usize) {
    histogram!("apollo_client_changed_namespaces").record(count as f64);
}

/// Record a namespace fetch
pub fn record_fetch(namespace: &str, outcome: &str) {
    counter!(
        "apollo_client_fetches_total",
        "namespace" => namespace.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// Set key count of a namespace as last fetched
pub fn set_namespace_keys(namespace: &str, count: usize) {
    gauge!(
        "apollo_client_namespace_keys",
        "namespace" => namespace.to_string()
    )
    .set(count as f64);
}

/// Set key count of the last merged snapshot
pub fn set_merged_keys(count: usize) {
    gauge!("apollo_client_merged_keys").set(count as f64);
}

/// Record keys displaced by a higher-priority namespace during merge
pub fn record_displaced_keys(count: usize) {
    counter!("apollo_client_displaced_keys_total").increment(count as u64);
}

/// Record a snapshot write
pub fn record_snapshot_write(bytes: usize) {
    counter!("apollo_client_snapshot_writes_total").increment(1);
    histogram!("apollo_client_snapshot_bytes").record(bytes as f64);
}

/// Record an error with category for alerting
pub fn record_error(operation: &str, error_type: &str) {
    counter!(
        "apollo_client_errors_total",
        "operation" => operation.to_string(),
        "error_type" => error_type.to_string()
    )
    .increment(1);
}

/// A timing guard that records request latency on drop
pub struct LatencyTimer {
    operation: &'static str,
    start: Instant,
}

impl LatencyTimer {
    /// Start a new latency timer
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            start: Instant::now(),
        }
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        record_latency(self.operation, self.start.elapsed());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // These verify the API doesn't panic without a recorder installed.
    // Assertions against recorded values live in tests/cycle.rs.

    #[test]
    fn test_record_cycle() {
        record_cycle("incremental", "written");
        record_cycle("full", "failed");
        record_cycle_duration("incremental", Duration::from_millis(12));
    }

    #[test]
    fn test_fetch_metrics() {
        record_fetch("application", "updated");
        record_fetch("application", "unchanged");
        set_namespace_keys("application", 42);
    }

    #[test]
    fn test_merge_and_snapshot_metrics() {
        set_merged_keys(100);
        record_displaced_keys(3);
        record_snapshot_write(2048);
        record_changed_namespaces(2);
    }

    #[test]
    fn test_latency_timer() {
        {
            let _timer = LatencyTimer::new("configs");
            std::thread::sleep(Duration::from_micros(10));
        }
        // Timer recorded on drop
    }
}
