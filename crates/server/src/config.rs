//! Collector configuration

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use telemetry_lib::{BenchmarkConfig, MonitorConfig};

/// Optional config file, looked up in the working directory
const CONFIG_FILE: &str = "telemetry";

/// Prefix for environment overrides, e.g. `TELEMETRY_LISTEN_PORT`
const ENV_PREFIX: &str = "TELEMETRY";

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// HTTP listen port
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Directory for snapshot files and reports
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_observation_capacity")]
    pub observation_capacity: usize,

    #[serde(default = "default_health_capacity")]
    pub health_capacity: usize,

    /// Health collection interval in seconds
    #[serde(default = "default_health_interval")]
    pub health_interval_secs: u64,

    /// Snapshot flush interval in seconds
    #[serde(default = "default_flush_interval")]
    pub flush_interval_secs: u64,

    /// Statistics window in seconds
    #[serde(default = "default_stats_window")]
    pub stats_window_secs: u64,

    #[serde(default = "default_benchmark_test_size")]
    pub benchmark_test_size: usize,

    #[serde(default = "default_benchmark_history_capacity")]
    pub benchmark_history_capacity: usize,

    /// Reported in benchmark results; not measured
    #[serde(default = "default_model_size_mb")]
    pub model_size_mb: f64,

    /// Reported in benchmark results; not measured
    #[serde(default = "default_cross_validation_score")]
    pub cross_validation_score: f64,

    #[serde(default = "default_prediction_capacity")]
    pub prediction_capacity: usize,

    /// Prediction records between writes to disk
    #[serde(default = "default_prediction_flush_batch")]
    pub prediction_flush_batch: usize,

    /// Requests slower than this are logged as warnings
    #[serde(default = "default_slow_request_ms")]
    pub slow_request_ms: u64,
}

fn default_listen_port() -> u16 {
    5001
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_observation_capacity() -> usize {
    10_000
}

fn default_health_capacity() -> usize {
    2_880
}

fn default_health_interval() -> u64 {
    30
}

fn default_flush_interval() -> u64 {
    300
}

fn default_stats_window() -> u64 {
    24 * 60 * 60
}

fn default_benchmark_test_size() -> usize {
    1000
}

fn default_benchmark_history_capacity() -> usize {
    1000
}

fn default_model_size_mb() -> f64 {
    15.7
}

fn default_cross_validation_score() -> f64 {
    94.52
}

fn default_prediction_capacity() -> usize {
    100_000
}

fn default_prediction_flush_batch() -> usize {
    100
}

fn default_slow_request_ms() -> u64 {
    1000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_port: default_listen_port(),
            data_dir: default_data_dir(),
            observation_capacity: default_observation_capacity(),
            health_capacity: default_health_capacity(),
            health_interval_secs: default_health_interval(),
            flush_interval_secs: default_flush_interval(),
            stats_window_secs: default_stats_window(),
            benchmark_test_size: default_benchmark_test_size(),
            benchmark_history_capacity: default_benchmark_history_capacity(),
            model_size_mb: default_model_size_mb(),
            cross_validation_score: default_cross_validation_score(),
            prediction_capacity: default_prediction_capacity(),
            prediction_flush_batch: default_prediction_flush_batch(),
            slow_request_ms: default_slow_request_ms(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from `telemetry.toml` (optional) and environment
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(CONFIG_FILE).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()
            .context("Failed to read configuration")?;

        Self::from_config(config)
    }

    fn from_config(config: config::Config) -> Result<Self> {
        config
            .try_deserialize()
            .context("Invalid telemetry configuration")
    }

    pub fn health_interval(&self) -> Duration {
        Duration::from_secs(self.health_interval_secs.max(1))
    }

    pub fn flush_interval(&self) -> Duration {
        Duration::from_secs(self.flush_interval_secs.max(1))
    }

    pub fn slow_request_threshold(&self) -> Duration {
        Duration::from_millis(self.slow_request_ms)
    }

    pub fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            observation_capacity: self.observation_capacity,
            health_capacity: self.health_capacity,
            stats_window: Duration::from_secs(self.stats_window_secs),
        }
    }

    pub fn benchmark_config(&self) -> BenchmarkConfig {
        BenchmarkConfig {
            test_set_size: self.benchmark_test_size,
            history_capacity: self.benchmark_history_capacity,
            model_size_mb: self.model_size_mb,
            cross_validation_score: self.cross_validation_score,
        }
    }
}
