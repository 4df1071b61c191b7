//! Observability for the telemetry collector itself
//!
//! Provides:
//! - Prometheus metrics (request latency, buffer occupancy, flush outcomes, benchmark quality)
//! - Structured logging of significant collector events with tracing

use crate::models::BenchmarkResult;
use prometheus::{
    register_gauge, register_histogram, register_int_counter, register_int_counter_vec,
    register_int_gauge, Gauge, Histogram, IntCounter, IntCounterVec, IntGauge,
};
use std::path::Path;
use std::sync::OnceLock;
use tracing::{error, info, warn};

/// Histogram buckets for request latency (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<TelemetryMetricsInner> = OnceLock::new();

struct TelemetryMetricsInner {
    request_latency_seconds: Histogram,
    observations_buffered: IntGauge,
    health_snapshots_buffered: IntGauge,
    flushes: IntCounter,
    flush_failures: IntCounter,
    benchmark_runs: IntCounter,
    benchmark_accuracy: Gauge,
    benchmark_f1: Gauge,
    predictions_recorded: IntCounter,
    reports_exported: IntCounterVec,
}

impl TelemetryMetricsInner {
    fn new() -> Self {
        Self {
            request_latency_seconds: register_histogram!(
                "finergy_telemetry_request_latency_seconds",
                "Latency of tracked HTTP requests",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register request_latency_seconds"),

            observations_buffered: register_int_gauge!(
                "finergy_telemetry_observations_buffered",
                "Request observations currently held in memory"
            )
            .expect("Failed to register observations_buffered"),

            health_snapshots_buffered: register_int_gauge!(
                "finergy_telemetry_health_snapshots_buffered",
                "Health snapshots currently held in memory"
            )
            .expect("Failed to register health_snapshots_buffered"),

            flushes: register_int_counter!(
                "finergy_telemetry_flushes_total",
                "Snapshot files written successfully"
            )
            .expect("Failed to register flushes_total"),

            flush_failures: register_int_counter!(
                "finergy_telemetry_flush_failures_total",
                "Snapshot writes that failed"
            )
            .expect("Failed to register flush_failures_total"),

            benchmark_runs: register_int_counter!(
                "finergy_telemetry_benchmark_runs_total",
                "Synthetic benchmark runs completed"
            )
            .expect("Failed to register benchmark_runs_total"),

            benchmark_accuracy: register_gauge!(
                "finergy_telemetry_benchmark_accuracy_percent",
                "Accuracy of the most recent benchmark run"
            )
            .expect("Failed to register benchmark_accuracy_percent"),

            benchmark_f1: register_gauge!(
                "finergy_telemetry_benchmark_f1_percent",
                "F1 score of the most recent benchmark run"
            )
            .expect("Failed to register benchmark_f1_percent"),

            predictions_recorded: register_int_counter!(
                "finergy_telemetry_predictions_recorded_total",
                "Prediction calls recorded"
            )
            .expect("Failed to register predictions_recorded_total"),

            reports_exported: register_int_counter_vec!(
                "finergy_telemetry_reports_exported_total",
                "Report files exported, by report kind",
                &["kind"]
            )
            .expect("Failed to register reports_exported_total"),
        }
    }
}

/// Collector metrics for Prometheus exposition
///
/// Lightweight handle to the global metrics instance; clones share the
/// same underlying metrics.
#[derive(Clone)]
pub struct TelemetryMetrics {
    _private: (),
}

impl Default for TelemetryMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryMetrics {
    /// Create a new metrics handle (registers global metrics on first call)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(TelemetryMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &TelemetryMetricsInner {
        GLOBAL_METRICS.get_or_init(TelemetryMetricsInner::new)
    }

    pub fn observe_request_latency(&self, duration_ms: f64) {
        self.inner()
            .request_latency_seconds
            .observe(duration_ms / 1000.0);
    }

    pub fn set_observations_buffered(&self, count: usize) {
        self.inner().observations_buffered.set(count as i64);
    }

    pub fn set_health_snapshots_buffered(&self, count: usize) {
        self.inner().health_snapshots_buffered.set(count as i64);
    }

    pub fn inc_flushes(&self) {
        self.inner().flushes.inc();
    }

    pub fn inc_flush_failures(&self) {
        self.inner().flush_failures.inc();
    }

    /// Record a completed benchmark run
    pub fn record_benchmark(&self, result: &BenchmarkResult) {
        let inner = self.inner();
        inner.benchmark_runs.inc();
        inner.benchmark_accuracy.set(result.accuracy);
        inner.benchmark_f1.set(result.f1_score);
    }

    pub fn inc_predictions_recorded(&self) {
        self.inner().predictions_recorded.inc();
    }

    pub fn inc_reports_exported(&self, kind: &str) {
        self.inner().reports_exported.with_label_values(&[kind]).inc();
    }
}

/// Structured logger for collector events
///
/// Emits consistently named events so the JSON log stream can be filtered
/// by `event`.
#[derive(Clone)]
pub struct StructuredLogger {
    service: String,
}

impl StructuredLogger {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    pub fn log_startup(&self, version: &str, data_dir: &Path) {
        info!(
            event = "telemetry_started",
            service = %self.service,
            version = %version,
            data_dir = %data_dir.display(),
            "Telemetry collector started"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "telemetry_shutdown",
            service = %self.service,
            reason = %reason,
            "Telemetry collector shutting down"
        );
    }

    pub fn log_flush(&self, file: &str, entries: usize) {
        info!(
            event = "snapshot_flushed",
            service = %self.service,
            file = %file,
            entries = entries,
            "Snapshot written"
        );
    }

    pub fn log_flush_failure(&self, file: &str, error: &dyn std::error::Error) {
        error!(
            event = "snapshot_flush_failed",
            service = %self.service,
            file = %file,
            error = %error,
            "Failed to flush snapshot to disk"
        );
    }

    pub fn log_benchmark(&self, result: &BenchmarkResult) {
        info!(
            event = "benchmark_completed",
            service = %self.service,
            test_set_size = result.test_set_size,
            accuracy = result.accuracy,
            precision = result.precision,
            recall = result.recall,
            f1_score = result.f1_score,
            average_latency_ms = result.average_latency,
            "Benchmark completed"
        );
    }

    pub fn log_export(&self, kind: &str, path: &Path) {
        info!(
            event = "report_exported",
            service = %self.service,
            kind = %kind,
            path = %path.display(),
            "Report exported"
        );
    }

    pub fn log_export_failure(&self, kind: &str, error: &dyn std::fmt::Display) {
        error!(
            event = "report_export_failed",
            service = %self.service,
            kind = %kind,
            error = %error,
            "Failed to export report"
        );
    }

    pub fn log_slow_request(&self, method: &str, endpoint: &str, duration_ms: f64, threshold_ms: f64) {
        warn!(
            event = "slow_request",
            service = %self.service,
            method = %method,
            endpoint = %endpoint,
            duration_ms = duration_ms,
            threshold_ms = threshold_ms,
            "Request exceeded latency threshold"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_telemetry_metrics_handles_share_registry() {
        let metrics = TelemetryMetrics::new();
        let other = metrics.clone();

        metrics.observe_request_latency(12.0);
        metrics.set_observations_buffered(3);
        other.set_health_snapshots_buffered(2);
        other.inc_flushes();
        other.inc_flush_failures();
        other.inc_predictions_recorded();
        other.inc_reports_exported("performance");

        let families = prometheus::gather();
        assert!(families
            .iter()
            .any(|f| f.get_name() == "finergy_telemetry_observations_buffered"));
    }

    #[test]
    fn test_record_benchmark_sets_gauges() {
        let metrics = TelemetryMetrics::new();
        metrics.record_benchmark(&BenchmarkResult {
            timestamp: Utc::now(),
            test_set_size: 10,
            accuracy: 80.0,
            precision: 75.0,
            recall: 90.0,
            f1_score: 81.82,
            average_latency: 0.01,
            p50_latency_ms: 0.01,
            p95_latency_ms: 0.02,
            p99_latency_ms: 0.03,
            true_positives: 6,
            false_positives: 2,
            true_negatives: 2,
            false_negatives: 0,
            model_size: 15.7,
            cross_validation_score: 94.52,
        });

        let families = prometheus::gather();
        // Other tests in this process run benchmarks too, so only check registration
        let f1 = families
            .iter()
            .find(|f| f.get_name() == "finergy_telemetry_benchmark_f1_percent")
            .expect("f1 gauge registered");
        let value = f1.get_metric()[0].get_gauge().get_value();
        assert!((0.0..=100.0).contains(&value));
    }

    #[test]
    fn test_structured_logger_creation() {
        let logger = StructuredLogger::new("finergy-telemetry");
        assert_eq!(logger.service, "finergy-telemetry");
    }
}
