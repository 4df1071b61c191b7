//! In-process performance and benchmark telemetry
//!
//! This crate provides the core functionality for:
//! - Capped in-memory buffers of request observations and health snapshots
//! - Aggregate request statistics over a time window
//! - Periodic health collection and flushing to disk
//! - A synthetic benchmark of the investment scoring function
//! - Prediction recording and report export
//! - Health checks and observability

pub mod benchmark;
pub mod buffer;
pub mod collector;
pub mod error;
pub mod flush;
pub mod health;
pub mod models;
pub mod monitor;
pub mod observability;
pub mod predictions;
pub mod report;
pub mod sampler;
pub mod stats;
pub mod store;

pub use benchmark::{BenchmarkConfig, BenchmarkRunner, HeuristicScorer, Scorer};
pub use buffer::{BufferStats, SampleBuffer};
pub use collector::HealthCollectionLoop;
pub use error::PersistError;
pub use flush::{FlushLoop, FlushStats};
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use models::*;
pub use monitor::{MonitorConfig, PerformanceMonitor, RequestInfo, RequestTimer};
pub use observability::{StructuredLogger, TelemetryMetrics};
pub use predictions::{ModelPerformance, PredictionInput, PredictionRecorder};
pub use report::{ModelReport, PerformanceReport, ReportExporter};
pub use sampler::{FixedSampler, ProcessSampler, ResourceSampler};
pub use stats::PerformanceStats;
pub use store::{FileSnapshotStore, SnapshotStore};
