//! Benchmark execution and history

use super::dataset::generate_dataset;
use super::metrics::{as_percent, ConfusionMatrix};
use super::Scorer;
use crate::buffer::SampleBuffer;
use crate::health::{components, HealthRegistry};
use crate::models::BenchmarkResult;
use crate::observability::{StructuredLogger, TelemetryMetrics};
use crate::stats::{mean, percentile, round2};
use crate::store::{to_pretty_json, SnapshotStore, BENCHMARKS_FILE};
use anyhow::{Context, Result};
use chrono::Utc;
use rand::Rng;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

/// Default number of synthetic projects per run
pub const DEFAULT_TEST_SET_SIZE: usize = 1000;

/// Configuration for benchmark runs
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    /// Synthetic projects scored per run (default: 1000)
    pub test_set_size: usize,
    /// Runs kept in history (default: 1000)
    pub history_capacity: usize,
    /// Reported model size; not measured
    pub model_size_mb: f64,
    /// Reported cross-validation score; not measured
    pub cross_validation_score: f64,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            test_set_size: DEFAULT_TEST_SET_SIZE,
            history_capacity: 1000,
            model_size_mb: 15.7,
            cross_validation_score: 94.52,
        }
    }
}

/// Scores synthetic datasets and keeps a history of results
pub struct BenchmarkRunner {
    scorer: Arc<dyn Scorer>,
    store: Arc<dyn SnapshotStore>,
    config: BenchmarkConfig,
    history: RwLock<SampleBuffer<BenchmarkResult>>,
    health: HealthRegistry,
    logger: StructuredLogger,
    metrics: TelemetryMetrics,
}

impl BenchmarkRunner {
    pub fn new(
        config: BenchmarkConfig,
        scorer: Arc<dyn Scorer>,
        store: Arc<dyn SnapshotStore>,
    ) -> Self {
        Self {
            scorer,
            store,
            history: RwLock::new(SampleBuffer::new(config.history_capacity)),
            config,
            health: HealthRegistry::new(),
            logger: StructuredLogger::new("finergy-telemetry"),
            metrics: TelemetryMetrics::new(),
        }
    }

    pub fn with_health(mut self, health: HealthRegistry) -> Self {
        self.health = health;
        self
    }

    pub fn with_logger(mut self, logger: StructuredLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn config(&self) -> &BenchmarkConfig {
        &self.config
    }

    /// Run one benchmark and record it in the history
    pub async fn run(&self) -> Result<BenchmarkResult> {
        let result = {
            let mut rng = rand::thread_rng();
            self.evaluate(&mut rng)?
        };
        self.record(result.clone()).await;
        Ok(result)
    }

    /// Generate a dataset from `rng` and score every row
    ///
    /// Does not touch the history; see [`BenchmarkRunner::record`].
    pub fn evaluate<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<BenchmarkResult> {
        let dataset = generate_dataset(rng, self.config.test_set_size);

        let mut matrix = ConfusionMatrix::new();
        let mut latencies = Vec::with_capacity(dataset.len());

        for row in &dataset {
            let started = Instant::now();
            let prediction = self.scorer.score(&row.features).with_context(|| {
                format!(
                    "Failed to score {} project in {}",
                    row.features.project_type, row.features.location
                )
            })?;
            latencies.push(started.elapsed().as_secs_f64() * 1000.0);

            matrix.record(prediction.predicts_success(), row.expected.is_success());
        }

        Ok(BenchmarkResult {
            timestamp: Utc::now(),
            test_set_size: dataset.len(),
            accuracy: as_percent(matrix.accuracy()),
            precision: as_percent(matrix.precision()),
            recall: as_percent(matrix.recall()),
            f1_score: as_percent(matrix.f1()),
            average_latency: round2(mean(&latencies)),
            p50_latency_ms: round2(percentile(&latencies, 50.0)),
            p95_latency_ms: round2(percentile(&latencies, 95.0)),
            p99_latency_ms: round2(percentile(&latencies, 99.0)),
            true_positives: matrix.true_positives,
            false_positives: matrix.false_positives,
            true_negatives: matrix.true_negatives,
            false_negatives: matrix.false_negatives,
            model_size: self.config.model_size_mb,
            cross_validation_score: self.config.cross_validation_score,
        })
    }

    /// Append a result to the history and persist the whole history
    ///
    /// A failed write is logged; the in-memory history keeps the result.
    pub async fn record(&self, result: BenchmarkResult) {
        self.metrics.record_benchmark(&result);
        self.logger.log_benchmark(&result);

        let history = {
            let mut history = self.history.write().await;
            history.push(result);
            history.snapshot()
        };

        let written = match to_pretty_json("benchmark history", &history) {
            Ok(bytes) => self.store.write(BENCHMARKS_FILE, bytes).await,
            Err(e) => Err(e),
        };

        match written {
            Ok(_) => {
                self.logger.log_flush(BENCHMARKS_FILE, history.len());
                self.health.record_success(components::BENCHMARK).await;
            }
            Err(e) => {
                self.metrics.inc_flush_failures();
                self.logger.log_flush_failure(BENCHMARKS_FILE, &e);
                self.health
                    .record_failure(components::BENCHMARK, e.to_string())
                    .await;
            }
        }
    }

    /// All retained results, oldest first
    pub async fn history(&self) -> Vec<BenchmarkResult> {
        self.history.read().await.snapshot()
    }

    pub async fn latest(&self) -> Option<BenchmarkResult> {
        self.history.read().await.last().cloned()
    }
}
