//! Periodic health collection
//!
//! Samples process and host health on a fixed interval and appends the
//! snapshot to the monitor's health buffer.

use crate::health::{components, HealthRegistry};
use crate::monitor::PerformanceMonitor;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

/// Default health collection interval (30 seconds)
pub const DEFAULT_HEALTH_INTERVAL: Duration = Duration::from_secs(30);

/// Loop appending a health snapshot every `interval`
pub struct HealthCollectionLoop {
    monitor: Arc<PerformanceMonitor>,
    health: HealthRegistry,
    interval: Duration,
}

impl HealthCollectionLoop {
    pub fn new(monitor: Arc<PerformanceMonitor>, health: HealthRegistry, interval: Duration) -> Self {
        Self {
            monitor,
            health,
            interval,
        }
    }

    /// Run until the shutdown signal fires
    ///
    /// The first snapshot is taken immediately so health data exists as soon
    /// as the collector is up.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        info!(
            interval_secs = self.interval.as_secs(),
            "Starting health collection loop"
        );

        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut collection_count = 0u64;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.monitor.collect_health().await;
                    self.health.record_success(components::HEALTH_COLLECTOR).await;

                    collection_count += 1;
                    // Roughly every hour at the default interval
                    if collection_count % 120 == 0 {
                        debug!(collections = collection_count, "Health collection running");
                    }
                }
                _ = shutdown.recv() => {
                    info!(collections = collection_count, "Shutting down health collection loop");
                    break;
                }
            }
        }
    }
}
