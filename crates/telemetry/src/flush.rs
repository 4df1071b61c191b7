//! Periodic flush of buffered telemetry to disk
//!
//! Every flush overwrites `performance-metrics.json` and `system-health.json`
//! with the current buffer contents. Write failures are logged and counted;
//! they never stop the loop and never reach the caller.

use crate::error::PersistError;
use crate::health::{components, HealthRegistry};
use crate::monitor::PerformanceMonitor;
use crate::observability::{StructuredLogger, TelemetryMetrics};
use crate::store::{to_pretty_json, SnapshotStore, PERFORMANCE_METRICS_FILE, SYSTEM_HEALTH_FILE};
use anyhow::Result;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

/// Default flush interval (5 minutes)
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Cumulative flush counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushStats {
    /// Files written successfully
    pub flushes: u64,
    /// Files that failed to write
    pub failures: u64,
}

/// Result of a single flush pass
#[derive(Debug, Clone, Default)]
pub struct FlushOutcome {
    pub written: usize,
    /// Buffers that were empty and left their file untouched
    pub skipped: usize,
    pub failed: usize,
    pub last_error: Option<String>,
}

/// Loop writing both buffers to the store every `interval`
pub struct FlushLoop {
    monitor: Arc<PerformanceMonitor>,
    store: Arc<dyn SnapshotStore>,
    health: HealthRegistry,
    logger: StructuredLogger,
    metrics: TelemetryMetrics,
    interval: Duration,
    flushes: AtomicU64,
    failures: AtomicU64,
}

impl FlushLoop {
    pub fn builder() -> FlushLoopBuilder {
        FlushLoopBuilder::new()
    }

    pub fn stats(&self) -> FlushStats {
        FlushStats {
            flushes: self.flushes.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }

    /// Run until the shutdown signal fires, then flush one last time
    pub async fn run(self: Arc<Self>, mut shutdown: broadcast::Receiver<()>) {
        info!(
            interval_secs = self.interval.as_secs(),
            "Starting flush loop"
        );

        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.flush_once().await;
                }
                _ = shutdown.recv() => {
                    info!("Flush loop stopping, writing final snapshot");
                    self.flush_once().await;
                    break;
                }
            }
        }

        let stats = self.stats();
        info!(
            flushes = stats.flushes,
            failures = stats.failures,
            "Flush loop stopped"
        );
    }

    /// Write both buffers once; failures are logged, never returned
    pub async fn flush_once(&self) -> FlushOutcome {
        // Copies are taken before any I/O so no lock is held while writing
        let observations = self.monitor.observations().await;
        let health_snapshots = self.monitor.health_snapshots().await;

        let mut outcome = FlushOutcome::default();
        self.flush_file(
            PERFORMANCE_METRICS_FILE,
            "observations",
            &observations,
            &mut outcome,
        )
        .await;
        self.flush_file(
            SYSTEM_HEALTH_FILE,
            "health snapshots",
            &health_snapshots,
            &mut outcome,
        )
        .await;

        match &outcome.last_error {
            Some(message) => {
                self.health
                    .record_failure(components::FLUSHER, message.clone())
                    .await
            }
            None => self.health.record_success(components::FLUSHER).await,
        }

        debug!(
            written = outcome.written,
            skipped = outcome.skipped,
            failed = outcome.failed,
            "Flush pass complete"
        );
        outcome
    }

    async fn flush_file<T: Serialize + Sync>(
        &self,
        file: &str,
        what: &'static str,
        entries: &[T],
        outcome: &mut FlushOutcome,
    ) {
        if entries.is_empty() {
            outcome.skipped += 1;
            return;
        }

        match self.write_entries(file, what, entries).await {
            Ok(()) => {
                self.flushes.fetch_add(1, Ordering::Relaxed);
                self.metrics.inc_flushes();
                self.logger.log_flush(file, entries.len());
                outcome.written += 1;
            }
            Err(e) => {
                self.failures.fetch_add(1, Ordering::Relaxed);
                self.metrics.inc_flush_failures();
                self.logger.log_flush_failure(file, &e);
                outcome.failed += 1;
                outcome.last_error = Some(e.to_string());
            }
        }
    }

    async fn write_entries<T: Serialize + Sync>(
        &self,
        file: &str,
        what: &'static str,
        entries: &[T],
    ) -> Result<(), PersistError> {
        let bytes = to_pretty_json(what, entries)?;
        self.store.write(file, bytes).await?;
        Ok(())
    }
}

/// Builder for the flush loop
pub struct FlushLoopBuilder {
    monitor: Option<Arc<PerformanceMonitor>>,
    store: Option<Arc<dyn SnapshotStore>>,
    health: Option<HealthRegistry>,
    logger: Option<StructuredLogger>,
    interval: Duration,
}

impl FlushLoopBuilder {
    pub fn new() -> Self {
        Self {
            monitor: None,
            store: None,
            health: None,
            logger: None,
            interval: DEFAULT_FLUSH_INTERVAL,
        }
    }

    pub fn monitor(mut self, monitor: Arc<PerformanceMonitor>) -> Self {
        self.monitor = Some(monitor);
        self
    }

    pub fn store(mut self, store: Arc<dyn SnapshotStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn health(mut self, health: HealthRegistry) -> Self {
        self.health = Some(health);
        self
    }

    pub fn logger(mut self, logger: StructuredLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn build(self) -> Result<FlushLoop> {
        let monitor = self
            .monitor
            .ok_or_else(|| anyhow::anyhow!("Monitor is required"))?;
        let store = self
            .store
            .ok_or_else(|| anyhow::anyhow!("Store is required"))?;

        Ok(FlushLoop {
            monitor,
            store,
            health: self.health.unwrap_or_default(),
            logger: self
                .logger
                .unwrap_or_else(|| StructuredLogger::new("finergy-telemetry")),
            metrics: TelemetryMetrics::new(),
            interval: self.interval,
            flushes: AtomicU64::new(0),
            failures: AtomicU64::new(0),
        })
    }
}

impl Default for FlushLoopBuilder {
    fn default() -> Self {
        Self::new()
    }
}
