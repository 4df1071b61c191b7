//! Request and health telemetry held in memory
//!
//! `PerformanceMonitor` owns the observation and health-snapshot buffers.
//! It is constructed once at startup and shared by `Arc`; appends and
//! snapshot copies are the only work done under its locks.

use crate::buffer::{
    BufferStats, SampleBuffer, DEFAULT_HEALTH_CAPACITY, DEFAULT_OBSERVATION_CAPACITY,
};
use crate::models::{CpuUsage, HealthSnapshot, Observation};
use crate::observability::TelemetryMetrics;
use crate::sampler::ResourceSampler;
use crate::stats::{round2, PerformanceStats, DEFAULT_STATS_WINDOW};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

/// Configuration for the performance monitor
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Maximum request observations kept (default: 10,000)
    pub observation_capacity: usize,
    /// Maximum health snapshots kept (default: 2,880)
    pub health_capacity: usize,
    /// Window used by `stats()` (default: 24 hours)
    pub stats_window: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            observation_capacity: DEFAULT_OBSERVATION_CAPACITY,
            health_capacity: DEFAULT_HEALTH_CAPACITY,
            stats_window: DEFAULT_STATS_WINDOW,
        }
    }
}

/// Started when a request arrives, consumed when it completes
#[derive(Debug, Clone, Copy)]
pub struct RequestTimer {
    started: Instant,
    cpu_at_start: CpuUsage,
}

impl RequestTimer {
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// What the HTTP layer knows about a finished request
#[derive(Debug, Clone)]
pub struct RequestInfo {
    pub endpoint: String,
    pub method: String,
    pub status_code: u16,
    pub user_agent: Option<String>,
}

/// In-memory request and health telemetry
pub struct PerformanceMonitor {
    observations: RwLock<SampleBuffer<Observation>>,
    health: RwLock<SampleBuffer<HealthSnapshot>>,
    sampler: Arc<dyn ResourceSampler>,
    metrics: TelemetryMetrics,
    config: MonitorConfig,
    started_at: Instant,
}

impl PerformanceMonitor {
    pub fn new(config: MonitorConfig, sampler: Arc<dyn ResourceSampler>) -> Self {
        Self {
            observations: RwLock::new(SampleBuffer::new(config.observation_capacity)),
            health: RwLock::new(SampleBuffer::new(config.health_capacity)),
            sampler,
            metrics: TelemetryMetrics::new(),
            config,
            started_at: Instant::now(),
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Time since the monitor was created
    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Begin timing a request
    pub fn start_request(&self) -> RequestTimer {
        RequestTimer {
            started: Instant::now(),
            cpu_at_start: self.sampler.cpu_time(),
        }
    }

    /// Build an observation for a completed request and buffer it
    pub async fn finish_request(&self, timer: RequestTimer, info: RequestInfo) -> Observation {
        let elapsed = timer.started.elapsed();
        let cpu_usage = self.sampler.cpu_time().since(&timer.cpu_at_start);

        let observation = Observation {
            timestamp: Utc::now(),
            endpoint: info.endpoint,
            response_time_ms: round2(elapsed.as_secs_f64() * 1000.0),
            status_code: info.status_code,
            method: info.method,
            user_agent: info.user_agent,
            memory_usage: self.sampler.memory(),
            cpu_usage,
        };

        self.record(observation.clone()).await;
        observation
    }

    /// Append an observation
    pub async fn record(&self, observation: Observation) {
        let latency_ms = observation.response_time_ms;
        let len = {
            let mut buffer = self.observations.write().await;
            buffer.push(observation);
            buffer.len()
        };

        self.metrics.observe_request_latency(latency_ms);
        self.metrics.set_observations_buffered(len);
    }

    /// Take a health reading and buffer it
    pub async fn collect_health(&self) -> HealthSnapshot {
        let load = self.sampler.system_load();
        let snapshot = HealthSnapshot {
            timestamp: Utc::now(),
            uptime_secs: self.uptime().as_secs_f64(),
            memory_usage: self.sampler.memory(),
            cpu_usage: self.sampler.cpu_time(),
            load_average: load.load_average,
            free_memory_bytes: load.free_memory_bytes,
            total_memory_bytes: load.total_memory_bytes,
        };

        let len = {
            let mut buffer = self.health.write().await;
            buffer.push(snapshot.clone());
            buffer.len()
        };
        self.metrics.set_health_snapshots_buffered(len);

        debug!(
            resident_bytes = snapshot.memory_usage.resident_bytes,
            load_1m = snapshot.load_average[0],
            buffered = len,
            "Health snapshot collected"
        );
        snapshot
    }

    /// Copy of the buffered observations, oldest first
    pub async fn observations(&self) -> Vec<Observation> {
        self.observations.read().await.snapshot()
    }

    /// Copy of the buffered health snapshots, oldest first
    pub async fn health_snapshots(&self) -> Vec<HealthSnapshot> {
        self.health.read().await.snapshot()
    }

    pub async fn observation_stats(&self) -> BufferStats {
        self.observations.read().await.stats()
    }

    pub async fn health_stats(&self) -> BufferStats {
        self.health.read().await.stats()
    }

    /// Statistics over the configured window ending now
    pub async fn stats(&self) -> PerformanceStats {
        self.stats_at(Utc::now()).await
    }

    /// Statistics over the configured window ending at `now`
    pub async fn stats_at(&self, now: DateTime<Utc>) -> PerformanceStats {
        let observations = self.observations().await;
        PerformanceStats::compute(
            &observations,
            now,
            self.config.stats_window,
            &self.sampler.memory(),
            self.uptime(),
        )
    }
}
