//! Synthetic labeled project generation

use crate::models::{Location, ProjectFeatures, ProjectType};
use crate::stats::{round1, round2};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Share of generated projects labeled as successful
const SUCCESS_THRESHOLD: f64 = 0.3;

/// Ground-truth label of a synthetic project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpectedOutcome {
    Success,
    Failure,
}

impl ExpectedOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ExpectedOutcome::Success)
    }
}

/// A generated project and its label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabeledProject {
    pub features: ProjectFeatures,
    pub expected: ExpectedOutcome,
}

/// Generate `size` independent labeled projects
///
/// The label is drawn independently of the features, so about 70% of rows
/// are successes regardless of what the scorer sees.
pub fn generate_dataset<R: Rng + ?Sized>(rng: &mut R, size: usize) -> Vec<LabeledProject> {
    (0..size).map(|_| generate_project(rng)).collect()
}

fn generate_project<R: Rng + ?Sized>(rng: &mut R) -> LabeledProject {
    let project_type = *ProjectType::ALL
        .choose(rng)
        .unwrap_or(&ProjectType::Solar);
    let location = *Location::ALL.choose(rng).unwrap_or(&Location::Kenya);

    let features = ProjectFeatures {
        project_type,
        location,
        capacity_mw: (rng.gen::<f64>() * 100.0 + 10.0).round(),
        irr_percent: round2(rng.gen::<f64>() * 15.0 + 8.0),
        esg_score: round1(rng.gen::<f64>() * 4.0 + 6.0),
        grid_stability: sub_score(rng),
        community_engagement: sub_score(rng),
        governance_framework: sub_score(rng),
    };

    let expected = if rng.gen::<f64>() > SUCCESS_THRESHOLD {
        ExpectedOutcome::Success
    } else {
        ExpectedOutcome::Failure
    };

    LabeledProject { features, expected }
}

/// Integer sub-score in 0..=10
fn sub_score<R: Rng + ?Sized>(rng: &mut R) -> u8 {
    (rng.gen::<f64>() * 10.0).round() as u8
}
