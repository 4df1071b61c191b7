//! HTTP API for telemetry queries, benchmarks, exports and health checks

use crate::config::ServerConfig;
use crate::tracking::track_requests;
use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use prometheus::{Encoder, TextEncoder};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use telemetry_lib::{
    health::{ComponentStatus, HealthRegistry},
    BenchmarkRunner, FileSnapshotStore, HeuristicScorer, PerformanceMonitor, PredictionInput,
    PredictionRecorder, ReportExporter, ResourceSampler, SnapshotStore, StructuredLogger,
};
use tracing::{error, info};

pub const SERVICE_NAME: &str = "finergy-telemetry";

/// Shared application state
pub struct AppState {
    pub health_registry: HealthRegistry,
    pub monitor: Arc<PerformanceMonitor>,
    pub benchmarks: Arc<BenchmarkRunner>,
    pub predictions: Arc<PredictionRecorder>,
    pub exporter: ReportExporter,
    pub store: Arc<dyn SnapshotStore>,
    pub logger: StructuredLogger,
    pub slow_request_threshold: Duration,
}

impl AppState {
    /// Wire every collector component from the server configuration
    pub fn from_config(
        config: &ServerConfig,
        sampler: Arc<dyn ResourceSampler>,
        health_registry: HealthRegistry,
    ) -> Self {
        let logger = StructuredLogger::new(SERVICE_NAME);
        let store: Arc<dyn SnapshotStore> = Arc::new(FileSnapshotStore::new(&config.data_dir));

        let monitor = Arc::new(PerformanceMonitor::new(config.monitor_config(), sampler));
        let benchmarks = Arc::new(
            BenchmarkRunner::new(
                config.benchmark_config(),
                Arc::new(HeuristicScorer::new()),
                store.clone(),
            )
            .with_health(health_registry.clone())
            .with_logger(logger.clone()),
        );
        let predictions = Arc::new(
            PredictionRecorder::new(
                store.clone(),
                config.prediction_capacity,
                config.prediction_flush_batch,
            )
            .with_logger(logger.clone()),
        );
        let exporter = ReportExporter::new(
            monitor.clone(),
            benchmarks.clone(),
            predictions.clone(),
            store.clone(),
        )
        .with_logger(logger.clone());

        Self {
            health_registry,
            monitor,
            benchmarks,
            predictions,
            exporter,
            store,
            logger,
            slow_request_threshold: config.slow_request_threshold(),
        }
    }
}

fn internal_error(err: anyhow::Error) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": format!("{err:#}") })),
    )
        .into_response()
}

fn exported(path: &Path) -> Response {
    Json(json!({ "path": path.display().to_string() })).into_response()
}

/// Health check response - returns 200 if healthy, 503 if unhealthy
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_registry.health().await;

    let status_code = match health.status {
        ComponentStatus::Healthy => StatusCode::OK,
        ComponentStatus::Degraded => StatusCode::OK,
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

/// Readiness check response - returns 200 if ready, 503 if not ready
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

/// Prometheus metrics endpoint
async fn metrics() -> Response {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!(error = %e, "Failed to encode metrics");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
        .into_response()
}

async fn performance_stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.monitor.stats().await)
}

async fn export_performance(State(state): State<Arc<AppState>>) -> Response {
    match state.exporter.export_performance().await {
        Ok(path) => exported(&path),
        Err(e) => internal_error(e),
    }
}

async fn run_benchmark(State(state): State<Arc<AppState>>) -> Response {
    match state.benchmarks.run().await {
        Ok(result) => Json(result).into_response(),
        Err(e) => {
            error!(error = %format!("{e:#}"), "Benchmark run failed");
            internal_error(e)
        }
    }
}

async fn benchmark_history(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.benchmarks.history().await)
}

async fn record_prediction(
    State(state): State<Arc<AppState>>,
    Json(input): Json<PredictionInput>,
) -> impl IntoResponse {
    let id = state.predictions.record(input).await;
    (StatusCode::CREATED, Json(json!({ "id": id })))
}

async fn model_performance(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let history = state.benchmarks.history().await;
    Json(state.predictions.performance(history).await)
}

async fn export_models(State(state): State<Arc<AppState>>) -> Response {
    match state.exporter.export_models().await {
        Ok(path) => exported(&path),
        Err(e) => internal_error(e),
    }
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .route("/api/performance/stats", get(performance_stats))
        .route("/api/performance/export", post(export_performance))
        .route("/api/benchmarks", get(benchmark_history))
        .route("/api/benchmarks/run", post(run_benchmark))
        .route("/api/predictions", post(record_prediction))
        .route("/api/models/performance", get(model_performance))
        .route("/api/models/export", post(export_models))
        .layer(middleware::from_fn_with_state(state.clone(), track_requests))
        .with_state(state)
}

/// Serve the API until `shutdown` resolves
pub async fn serve(
    port: u16,
    state: Arc<AppState>,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
