//! Core data models for the telemetry collector

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Process memory snapshot in bytes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryUsage {
    pub resident_bytes: u64,
    pub virtual_bytes: u64,
}

/// Process CPU time in microseconds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CpuUsage {
    pub user_micros: u64,
    pub system_micros: u64,
}

impl CpuUsage {
    /// CPU time spent since an earlier reading
    pub fn since(&self, start: &CpuUsage) -> CpuUsage {
        CpuUsage {
            user_micros: self.user_micros.saturating_sub(start.user_micros),
            system_micros: self.system_micros.saturating_sub(start.system_micros),
        }
    }
}

/// Host-level load and memory figures
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemLoad {
    pub load_average: [f64; 3],
    pub free_memory_bytes: u64,
    pub total_memory_bytes: u64,
}

/// A completed, tracked HTTP request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    pub timestamp: DateTime<Utc>,
    pub endpoint: String,
    /// Milliseconds, rounded to two decimals
    pub response_time_ms: f64,
    pub status_code: u16,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    pub memory_usage: MemoryUsage,
    /// CPU time consumed while the request was in flight
    pub cpu_usage: CpuUsage,
}

impl Observation {
    pub fn is_error(&self) -> bool {
        self.status_code >= 400
    }
}

/// Periodic process and host health reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthSnapshot {
    pub timestamp: DateTime<Utc>,
    pub uptime_secs: f64,
    pub memory_usage: MemoryUsage,
    pub cpu_usage: CpuUsage,
    pub load_average: [f64; 3],
    pub free_memory_bytes: u64,
    pub total_memory_bytes: u64,
}

/// Outcome of one synthetic benchmark run
///
/// `model_size_mb` and `cross_validation_score` are configured stand-ins and
/// are not measured by the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkResult {
    pub timestamp: DateTime<Utc>,
    pub test_set_size: usize,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub average_latency: f64,
    pub p50_latency_ms: f64,
    pub p95_latency_ms: f64,
    pub p99_latency_ms: f64,
    pub true_positives: u64,
    pub false_positives: u64,
    pub true_negatives: u64,
    pub false_negatives: u64,
    pub model_size: f64,
    pub cross_validation_score: f64,
}

/// Renewable project category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectType {
    Solar,
    Wind,
    Hydro,
    Biomass,
    Geothermal,
}

impl ProjectType {
    pub const ALL: [ProjectType; 5] = [
        ProjectType::Solar,
        ProjectType::Wind,
        ProjectType::Hydro,
        ProjectType::Biomass,
        ProjectType::Geothermal,
    ];
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Project region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Location {
    Nigeria,
    Ghana,
    Kenya,
    Senegal,
    Mali,
}

impl Location {
    pub const ALL: [Location; 5] = [
        Location::Nigeria,
        Location::Ghana,
        Location::Kenya,
        Location::Senegal,
        Location::Mali,
    ];
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Inputs the scoring function sees for one project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFeatures {
    pub project_type: ProjectType,
    pub location: Location,
    pub capacity_mw: f64,
    pub irr_percent: f64,
    pub esg_score: f64,
    pub grid_stability: u8,
    pub community_engagement: u8,
    pub governance_framework: u8,
}

/// Discrete risk band derived from the success probability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
        };
        f.write_str(s)
    }
}

/// Scoring output; probability and confidence are whole percentages
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub success_probability: u8,
    pub risk_level: RiskLevel,
    pub confidence: u8,
}

impl Prediction {
    /// A prediction counts as "success" strictly above 50%
    pub fn predicts_success(&self) -> bool {
        self.success_probability > 50
    }
}

/// A tracked prediction call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionRecord {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub model_version: String,
    pub project_type: String,
    pub location: String,
    pub capacity: f64,
    pub irr: f64,
    pub esg_score: f64,
    pub prediction: Prediction,
    pub processing_time: f64,
}
