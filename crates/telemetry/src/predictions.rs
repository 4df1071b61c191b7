//! Recording of prediction calls made by the application
//!
//! Records are kept in a capped buffer and the full list is written to
//! `model-predictions.json` every `flush_batch` records.

use crate::buffer::SampleBuffer;
use crate::models::{BenchmarkResult, Prediction, PredictionRecord, RiskLevel};
use crate::observability::{StructuredLogger, TelemetryMetrics};
use crate::stats::mean;
use crate::store::{to_pretty_json, SnapshotStore, PREDICTIONS_FILE};
use crate::benchmark::MODEL_VERSION;
use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Default number of prediction records kept in memory
pub const DEFAULT_PREDICTION_CAPACITY: usize = 100_000;

/// Default number of records between writes to disk
pub const DEFAULT_FLUSH_BATCH: usize = 100;

/// Records considered by the recent-performance summary
const RECENT_WINDOW: usize = 1000;

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_SUFFIX_LEN: usize = 9;

/// A prediction call as reported by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionInput {
    pub project_type: String,
    pub location: String,
    pub capacity: f64,
    pub irr: f64,
    pub esg_score: f64,
    pub prediction: Prediction,
    /// Milliseconds the prediction took
    pub processing_time: f64,
}

/// Share of recent predictions in each risk band, whole percent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskDistribution {
    #[serde(rename = "LOW")]
    pub low: u32,
    #[serde(rename = "MEDIUM")]
    pub medium: u32,
    #[serde(rename = "HIGH")]
    pub high: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentPerformance {
    pub average_processing_time: f64,
    pub average_confidence: f64,
    pub risk_distribution: RiskDistribution,
}

/// Summary of recorded predictions and benchmark results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelPerformance {
    /// Every prediction recorded, including evicted ones
    pub total_predictions: u64,
    pub recent_performance: RecentPerformance,
    pub latest_benchmark: Option<BenchmarkResult>,
    pub all_benchmarks: Vec<BenchmarkResult>,
}

/// Keeps prediction records and writes them out in batches
pub struct PredictionRecorder {
    records: RwLock<SampleBuffer<PredictionRecord>>,
    store: Arc<dyn SnapshotStore>,
    flush_batch: usize,
    logger: StructuredLogger,
    metrics: TelemetryMetrics,
}

impl PredictionRecorder {
    pub fn new(store: Arc<dyn SnapshotStore>, capacity: usize, flush_batch: usize) -> Self {
        Self {
            records: RwLock::new(SampleBuffer::new(capacity)),
            store,
            flush_batch: flush_batch.max(1),
            logger: StructuredLogger::new("finergy-telemetry"),
            metrics: TelemetryMetrics::new(),
        }
    }

    pub fn with_logger(mut self, logger: StructuredLogger) -> Self {
        self.logger = logger;
        self
    }

    /// Record a prediction call and return its generated id
    pub async fn record(&self, input: PredictionInput) -> String {
        let id = generate_id(&mut rand::thread_rng());
        let record = PredictionRecord {
            id: id.clone(),
            timestamp: Utc::now(),
            model_version: MODEL_VERSION.to_string(),
            project_type: input.project_type,
            location: input.location,
            capacity: input.capacity,
            irr: input.irr,
            esg_score: input.esg_score,
            prediction: input.prediction,
            processing_time: input.processing_time,
        };

        let batch = {
            let mut records = self.records.write().await;
            records.push(record);
            if records.total_pushed() % self.flush_batch as u64 == 0 {
                Some(records.snapshot())
            } else {
                None
            }
        };
        self.metrics.inc_predictions_recorded();

        if let Some(records) = batch {
            self.persist(&records).await;
        }
        id
    }

    async fn persist(&self, records: &[PredictionRecord]) {
        let written = match to_pretty_json("prediction records", records) {
            Ok(bytes) => self.store.write(PREDICTIONS_FILE, bytes).await,
            Err(e) => Err(e),
        };

        match written {
            Ok(_) => self.logger.log_flush(PREDICTIONS_FILE, records.len()),
            Err(e) => {
                self.metrics.inc_flush_failures();
                self.logger.log_flush_failure(PREDICTIONS_FILE, &e);
            }
        }
    }

    /// All retained records, oldest first
    pub async fn records(&self) -> Vec<PredictionRecord> {
        self.records.read().await.snapshot()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Summarize the most recent records alongside benchmark results
    pub async fn performance(&self, benchmarks: Vec<BenchmarkResult>) -> ModelPerformance {
        let (total_predictions, recent) = {
            let records = self.records.read().await;
            (records.total_pushed(), records.recent(RECENT_WINDOW))
        };

        ModelPerformance {
            total_predictions,
            recent_performance: summarize(&recent),
            latest_benchmark: benchmarks.last().cloned(),
            all_benchmarks: benchmarks,
        }
    }
}

fn summarize(records: &[PredictionRecord]) -> RecentPerformance {
    let processing: Vec<f64> = records.iter().map(|r| r.processing_time).collect();
    let confidence: Vec<f64> = records
        .iter()
        .map(|r| f64::from(r.prediction.confidence))
        .collect();

    RecentPerformance {
        average_processing_time: mean(&processing),
        average_confidence: mean(&confidence),
        risk_distribution: risk_distribution(records),
    }
}

fn risk_distribution(records: &[PredictionRecord]) -> RiskDistribution {
    if records.is_empty() {
        return RiskDistribution::default();
    }

    let (mut low, mut medium, mut high) = (0usize, 0usize, 0usize);
    for record in records {
        match record.prediction.risk_level {
            RiskLevel::Low => low += 1,
            RiskLevel::Medium => medium += 1,
            RiskLevel::High => high += 1,
        }
    }

    let percent = |count: usize| (count as f64 / records.len() as f64 * 100.0).round() as u32;
    RiskDistribution {
        low: percent(low),
        medium: percent(medium),
        high: percent(high),
    }
}

/// `pred_<unix-millis>_<9 lowercase base-36 chars>`
fn generate_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| char::from(ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())]))
        .collect();
    format!("pred_{}_{}", Utc::now().timestamp_millis(), suffix)
}
