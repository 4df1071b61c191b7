//! Heuristic investment scoring
//!
//! Stands in for the production gradient-boosting model. The score starts at
//! 0.5 and is nudged by IRR, ESG, capacity and location, then clamped.

use super::Scorer;
use crate::models::{Location, Prediction, ProjectFeatures, RiskLevel};
use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Mutex, PoisonError};

/// Version tag of the scoring model
pub const MODEL_VERSION: &str = "v2.1";

const BASE_SCORE: f64 = 0.5;

/// Raw success probability in [0, 1]
pub fn success_probability(features: &ProjectFeatures) -> f64 {
    let mut score = BASE_SCORE;

    if features.irr_percent > 15.0 {
        score += 0.2;
    } else if features.irr_percent < 10.0 {
        score -= 0.2;
    }

    if features.esg_score > 8.0 {
        score += 0.15;
    } else if features.esg_score < 7.0 {
        score -= 0.15;
    }

    if features.capacity_mw > 50.0 {
        score += 0.1;
    } else if features.capacity_mw < 20.0 {
        score -= 0.1;
    }

    score += location_adjustment(features.location);

    score.clamp(0.0, 1.0)
}

fn location_adjustment(location: Location) -> f64 {
    match location {
        Location::Nigeria => -0.05,
        Location::Ghana => 0.1,
        Location::Kenya => 0.0,
        Location::Senegal => 0.05,
        Location::Mali => -0.1,
    }
}

fn risk_level(probability: f64) -> RiskLevel {
    if probability > 0.7 {
        RiskLevel::Low
    } else if probability > 0.4 {
        RiskLevel::Medium
    } else {
        RiskLevel::High
    }
}

/// Rule-based scorer with a randomized confidence in 85..=100
pub struct HeuristicScorer {
    rng: Mutex<StdRng>,
}

impl HeuristicScorer {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Scorer with reproducible confidence values
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn confidence(&self) -> u8 {
        let u: f64 = self
            .rng
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .gen();
        ((0.85 + u * 0.15) * 100.0).round() as u8
    }
}

impl Default for HeuristicScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl Scorer for HeuristicScorer {
    fn score(&self, features: &ProjectFeatures) -> Result<Prediction> {
        let probability = success_probability(features);

        Ok(Prediction {
            success_probability: (probability * 100.0).round() as u8,
            risk_level: risk_level(probability),
            confidence: self.confidence(),
        })
    }

    fn model_version(&self) -> &str {
        MODEL_VERSION
    }
}
