//! On-demand report export
//!
//! Reports are assembled from snapshots of the live state and written to a
//! new timestamped file; exporting never mutates buffers or history.

use crate::benchmark::BenchmarkRunner;
use crate::models::{BenchmarkResult, HealthSnapshot, Observation, PredictionRecord};
use crate::monitor::PerformanceMonitor;
use crate::observability::{StructuredLogger, TelemetryMetrics};
use crate::predictions::{ModelPerformance, PredictionRecorder};
use crate::stats::PerformanceStats;
use crate::store::{to_pretty_json, SnapshotStore};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

pub const PERFORMANCE_REPORT_PREFIX: &str = "performance-report";
pub const MODEL_REPORT_PREFIX: &str = "model-performance-report";

const MODEL_NAME: &str = "FinergyCloud XGBoost v2.1";
const MODEL_TYPE: &str = "Gradient Boosting Classifier";
const MODEL_FEATURES: [&str; 8] = [
    "project_type",
    "location",
    "capacity",
    "irr",
    "esg_score",
    "grid_stability",
    "community_engagement",
    "governance_framework",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemInfo {
    pub version: String,
    pub os: String,
    pub arch: String,
    pub uptime_secs: f64,
}

impl SystemInfo {
    fn current(uptime_secs: f64) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            uptime_secs,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceReport {
    pub generated_at: DateTime<Utc>,
    pub system_info: SystemInfo,
    pub performance_metrics: PerformanceStats,
    pub raw_metrics: Vec<Observation>,
    pub system_health: Vec<HealthSnapshot>,
    pub benchmark_history: Vec<BenchmarkResult>,
}

/// Static description of the scored model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub model_type: String,
    pub features: Vec<String>,
    pub training_data_size: u32,
    pub test_data_size: u32,
    pub cross_validation_folds: u32,
}

impl Default for ModelInfo {
    fn default() -> Self {
        Self {
            name: MODEL_NAME.to_string(),
            model_type: MODEL_TYPE.to_string(),
            features: MODEL_FEATURES.iter().map(|f| f.to_string()).collect(),
            training_data_size: 10_000,
            test_data_size: 2_000,
            cross_validation_folds: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelReport {
    pub generated_at: DateTime<Utc>,
    pub model_info: ModelInfo,
    pub performance_metrics: ModelPerformance,
    pub raw_predictions: Vec<PredictionRecord>,
    pub benchmark_history: Vec<BenchmarkResult>,
}

/// Builds and writes performance and model reports
pub struct ReportExporter {
    monitor: Arc<PerformanceMonitor>,
    benchmarks: Arc<BenchmarkRunner>,
    predictions: Arc<PredictionRecorder>,
    store: Arc<dyn SnapshotStore>,
    logger: StructuredLogger,
    metrics: TelemetryMetrics,
}

impl ReportExporter {
    pub fn new(
        monitor: Arc<PerformanceMonitor>,
        benchmarks: Arc<BenchmarkRunner>,
        predictions: Arc<PredictionRecorder>,
        store: Arc<dyn SnapshotStore>,
    ) -> Self {
        Self {
            monitor,
            benchmarks,
            predictions,
            store,
            logger: StructuredLogger::new("finergy-telemetry"),
            metrics: TelemetryMetrics::new(),
        }
    }

    pub fn with_logger(mut self, logger: StructuredLogger) -> Self {
        self.logger = logger;
        self
    }

    pub async fn performance_report(&self) -> PerformanceReport {
        PerformanceReport {
            generated_at: Utc::now(),
            system_info: SystemInfo::current(self.monitor.uptime().as_secs_f64()),
            performance_metrics: self.monitor.stats().await,
            raw_metrics: self.monitor.observations().await,
            system_health: self.monitor.health_snapshots().await,
            benchmark_history: self.benchmarks.history().await,
        }
    }

    pub async fn model_report(&self) -> ModelReport {
        let benchmark_history = self.benchmarks.history().await;
        ModelReport {
            generated_at: Utc::now(),
            model_info: ModelInfo::default(),
            performance_metrics: self.predictions.performance(benchmark_history.clone()).await,
            raw_predictions: self.predictions.records().await,
            benchmark_history,
        }
    }

    /// Write a performance report and return its path
    pub async fn export_performance(&self) -> Result<PathBuf> {
        let report = self.performance_report().await;
        self.write("performance", PERFORMANCE_REPORT_PREFIX, &report)
            .await
    }

    /// Write a model report and return its path
    pub async fn export_models(&self) -> Result<PathBuf> {
        let report = self.model_report().await;
        self.write("model", MODEL_REPORT_PREFIX, &report).await
    }

    async fn write<T: Serialize + Sync>(
        &self,
        kind: &str,
        prefix: &str,
        report: &T,
    ) -> Result<PathBuf> {
        let result = match to_pretty_json("report", report) {
            Ok(bytes) => self.store.write_unique(prefix, bytes).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(path) => {
                self.metrics.inc_reports_exported(kind);
                self.logger.log_export(kind, &path);
                Ok(path)
            }
            Err(e) => {
                self.logger.log_export_failure(kind, &e);
                Err(e).with_context(|| format!("Failed to export {kind} report"))
            }
        }
    }
}
