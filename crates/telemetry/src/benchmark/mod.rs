//! Synthetic benchmark of the investment scoring function

mod dataset;
mod metrics;
mod runner;
mod scoring;

pub use dataset::{generate_dataset, ExpectedOutcome, LabeledProject};
pub use metrics::{as_percent, ConfusionMatrix};
pub use runner::{BenchmarkConfig, BenchmarkRunner, DEFAULT_TEST_SET_SIZE};
pub use scoring::{success_probability, HeuristicScorer, MODEL_VERSION};

use crate::models::{Prediction, ProjectFeatures};
use anyhow::Result;

/// Trait for scoring implementations
pub trait Scorer: Send + Sync {
    /// Score one project
    fn score(&self, features: &ProjectFeatures) -> Result<Prediction>;

    /// Version tag reported with every prediction
    fn model_version(&self) -> &str;
}
