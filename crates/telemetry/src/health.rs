//! Component health for the telemetry collector
//!
//! Each background task reports its own status; the overall status is the
//! worst component status. Readiness additionally requires startup to have
//! finished.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Health status of a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Healthy,
    /// Working, but the last operation failed
    Degraded,
    Unhealthy,
}

impl ComponentStatus {
    pub fn is_operational(&self) -> bool {
        !matches!(self, ComponentStatus::Unhealthy)
    }
}

/// Latest report from one component
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentHealth {
    pub status: ComponentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub checked_at: DateTime<Utc>,
    pub consecutive_failures: u32,
}

impl ComponentHealth {
    fn new(status: ComponentStatus, message: Option<String>, consecutive_failures: u32) -> Self {
        Self {
            status,
            message,
            checked_at: Utc::now(),
            consecutive_failures,
        }
    }
}

/// Overall health response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: ComponentStatus,
    pub components: BTreeMap<String, ComponentHealth>,
}

/// Readiness response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Component names for health tracking
pub mod components {
    pub const REQUEST_TRACKER: &str = "request_tracker";
    pub const HEALTH_COLLECTOR: &str = "health_collector";
    pub const FLUSHER: &str = "flusher";
    pub const BENCHMARK: &str = "benchmark";

    pub const ALL: [&str; 4] = [REQUEST_TRACKER, HEALTH_COLLECTOR, FLUSHER, BENCHMARK];
}

/// Shared registry of component health
#[derive(Debug, Clone, Default)]
pub struct HealthRegistry {
    components: Arc<RwLock<BTreeMap<String, ComponentHealth>>>,
    ready: Arc<RwLock<bool>>,
}

impl HealthRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every collector component registered as healthy
    pub async fn with_default_components() -> Self {
        let registry = Self::new();
        for name in components::ALL {
            registry.register(name).await;
        }
        registry
    }

    pub async fn register(&self, name: &str) {
        let mut components = self.components.write().await;
        components.insert(
            name.to_string(),
            ComponentHealth::new(ComponentStatus::Healthy, None, 0),
        );
    }

    /// Record a successful operation, clearing the failure streak
    pub async fn record_success(&self, name: &str) {
        let mut components = self.components.write().await;
        components.insert(
            name.to_string(),
            ComponentHealth::new(ComponentStatus::Healthy, None, 0),
        );
    }

    /// Record a failed operation; the component stays operational but degraded
    pub async fn record_failure(&self, name: &str, message: impl Into<String>) {
        let mut components = self.components.write().await;
        let failures = components
            .get(name)
            .map(|c| c.consecutive_failures)
            .unwrap_or(0)
            .saturating_add(1);
        components.insert(
            name.to_string(),
            ComponentHealth::new(ComponentStatus::Degraded, Some(message.into()), failures),
        );
    }

    pub async fn set_unhealthy(&self, name: &str, message: impl Into<String>) {
        let mut components = self.components.write().await;
        let failures = components
            .get(name)
            .map(|c| c.consecutive_failures)
            .unwrap_or(0);
        components.insert(
            name.to_string(),
            ComponentHealth::new(ComponentStatus::Unhealthy, Some(message.into()), failures),
        );
    }

    pub async fn set_ready(&self, ready: bool) {
        *self.ready.write().await = ready;
    }

    pub async fn component(&self, name: &str) -> Option<ComponentHealth> {
        self.components.read().await.get(name).cloned()
    }

    pub async fn health(&self) -> HealthResponse {
        let components = self.components.read().await.clone();
        let status = components
            .values()
            .map(|c| c.status)
            .max()
            .unwrap_or(ComponentStatus::Healthy);
        HealthResponse { status, components }
    }

    pub async fn readiness(&self) -> ReadinessResponse {
        if !*self.ready.read().await {
            return ReadinessResponse {
                ready: false,
                reason: Some("Collector still starting".to_string()),
            };
        }

        let health = self.health().await;
        if !health.status.is_operational() {
            let failing: Vec<&str> = health
                .components
                .iter()
                .filter(|(_, c)| !c.status.is_operational())
                .map(|(name, _)| name.as_str())
                .collect();
            return ReadinessResponse {
                ready: false,
                reason: Some(format!("Unhealthy components: {}", failing.join(", "))),
            };
        }

        ReadinessResponse {
            ready: true,
            reason: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_registry_is_healthy() {
        let registry = HealthRegistry::new();
        let health = registry.health().await;

        assert_eq!(health.status, ComponentStatus::Healthy);
        assert!(health.components.is_empty());
    }

    #[tokio::test]
    async fn test_default_components_registered() {
        let registry = HealthRegistry::with_default_components().await;
        let health = registry.health().await;

        for name in components::ALL {
            assert_eq!(health.components[name].status, ComponentStatus::Healthy);
        }
    }

    #[tokio::test]
    async fn test_failures_degrade_and_accumulate() {
        let registry = HealthRegistry::with_default_components().await;

        registry.record_failure(components::FLUSHER, "disk full").await;
        registry.record_failure(components::FLUSHER, "disk full").await;

        let flusher = registry.component(components::FLUSHER).await.unwrap();
        assert_eq!(flusher.status, ComponentStatus::Degraded);
        assert_eq!(flusher.consecutive_failures, 2);
        assert_eq!(registry.health().await.status, ComponentStatus::Degraded);

        registry.record_success(components::FLUSHER).await;
        let flusher = registry.component(components::FLUSHER).await.unwrap();
        assert_eq!(flusher.consecutive_failures, 0);
        assert_eq!(registry.health().await.status, ComponentStatus::Healthy);
    }

    #[tokio::test]
    async fn test_component_health_serializes_camel_case() {
        let registry = HealthRegistry::with_default_components().await;
        registry.record_failure(components::FLUSHER, "disk full").await;

        let json = serde_json::to_value(registry.health().await).unwrap();
        let flusher = &json["components"][components::FLUSHER];

        assert_eq!(flusher["consecutiveFailures"], 1);
        assert!(flusher["checkedAt"].is_string());
        assert!(flusher.get("consecutive_failures").is_none());
    }

    #[tokio::test]
    async fn test_unhealthy_dominates() {
        let registry = HealthRegistry::with_default_components().await;
        registry.record_failure(components::FLUSHER, "slow").await;
        registry
            .set_unhealthy(components::HEALTH_COLLECTOR, "stopped")
            .await;

        assert_eq!(registry.health().await.status, ComponentStatus::Unhealthy);
    }

    #[tokio::test]
    async fn test_readiness_lifecycle() {
        let registry = HealthRegistry::with_default_components().await;
        assert!(!registry.readiness().await.ready);

        registry.set_ready(true).await;
        assert!(registry.readiness().await.ready);

        // Degraded is still ready
        registry.record_failure(components::FLUSHER, "disk full").await;
        assert!(registry.readiness().await.ready);

        registry
            .set_unhealthy(components::HEALTH_COLLECTOR, "stopped")
            .await;
        let readiness = registry.readiness().await;
        assert!(!readiness.ready);
        assert!(readiness.reason.unwrap().contains("health_collector"));
    }
}
