//! Integration tests for the collector HTTP API

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use telemetry_lib::{
    health::{components, HealthRegistry},
    FixedSampler,
};
use telemetry_server::{create_router, AppState, ServerConfig};
use tempfile::TempDir;
use tower::ServiceExt;

async fn setup_test_app() -> (Router, Arc<AppState>, TempDir) {
    let dir = TempDir::new().unwrap();
    let config = ServerConfig {
        data_dir: dir.path().to_path_buf(),
        benchmark_test_size: 50,
        ..Default::default()
    };

    let health_registry = HealthRegistry::with_default_components().await;
    let state = Arc::new(AppState::from_config(
        &config,
        Arc::new(FixedSampler::default()),
        health_registry,
    ));
    let router = create_router(state.clone());

    (router, state, dir)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_healthz_returns_ok_when_healthy() {
    let (app, _state, _dir) = setup_test_app().await;

    let (status, health) = send(&app, "GET", "/healthz", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "healthy");
    assert!(health["components"][components::FLUSHER].is_object());
}

#[tokio::test]
async fn test_healthz_returns_ok_when_degraded() {
    let (app, state, _dir) = setup_test_app().await;
    state
        .health_registry
        .record_failure(components::FLUSHER, "disk full")
        .await;

    let (status, health) = send(&app, "GET", "/healthz", None).await;

    // Degraded still returns 200 (operational)
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "degraded");
    assert_eq!(health["components"]["flusher"]["consecutiveFailures"], 1);
}

#[tokio::test]
async fn test_healthz_returns_503_when_unhealthy() {
    let (app, state, _dir) = setup_test_app().await;
    state
        .health_registry
        .set_unhealthy(components::HEALTH_COLLECTOR, "Collection stopped")
        .await;

    let (status, health) = send(&app, "GET", "/healthz", None).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(health["status"], "unhealthy");
}

#[tokio::test]
async fn test_readyz_lifecycle() {
    let (app, state, _dir) = setup_test_app().await;

    let (status, readiness) = send(&app, "GET", "/readyz", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(readiness["ready"], false);

    state.health_registry.set_ready(true).await;
    let (status, readiness) = send(&app, "GET", "/readyz", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(readiness["ready"], true);
}

#[tokio::test]
async fn test_metrics_endpoint_exposes_collector_metrics() {
    let (app, _state, _dir) = setup_test_app().await;

    // Make sure at least one request has been observed
    send(&app, "GET", "/healthz", None).await;

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("finergy_telemetry_request_latency_seconds"));
}

#[tokio::test]
async fn test_requests_are_tracked_in_stats() {
    let (app, _state, _dir) = setup_test_app().await;

    for _ in 0..3 {
        send(&app, "GET", "/healthz", None).await;
    }
    // Rejected body, answered by the route with a 4xx
    send(
        &app,
        "POST",
        "/api/predictions",
        Some(json!({ "location": "Mali" })),
    )
    .await;

    let (status, stats) = send(&app, "GET", "/api/performance/stats", None).await;

    assert_eq!(status, StatusCode::OK);
    // The stats request itself is recorded after the response is built
    assert_eq!(stats["totalRequests"], 4);
    assert_eq!(stats["endpointBreakdown"]["/healthz"]["count"], 3);
    assert_eq!(stats["errorRate"], 25.0);
    assert!(stats["p95ResponseTime"].as_f64().unwrap() >= 0.0);
}

#[tokio::test]
async fn test_user_agent_is_recorded() {
    let (app, state, _dir) = setup_test_app().await;

    let request = Request::builder()
        .uri("/healthz")
        .header(header::USER_AGENT, "ftm/0.1")
        .body(Body::empty())
        .unwrap();
    app.clone().oneshot(request).await.unwrap();

    let observations = state.monitor.observations().await;
    assert_eq!(observations.len(), 1);
    assert_eq!(observations[0].user_agent.as_deref(), Some("ftm/0.1"));
    assert_eq!(observations[0].method, "GET");
}

#[tokio::test]
async fn test_benchmark_run_and_history() {
    let (app, _state, dir) = setup_test_app().await;

    let (status, result) = send(&app, "POST", "/api/benchmarks/run", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["testSetSize"], 50);
    assert_eq!(result["modelSize"], 15.7);

    let (status, history) = send(&app, "GET", "/api/benchmarks", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history.as_array().unwrap().len(), 1);

    assert!(dir.path().join("model-benchmarks.json").exists());
}

#[tokio::test]
async fn test_prediction_recording_feeds_model_performance() {
    let (app, _state, _dir) = setup_test_app().await;

    let prediction = json!({
        "projectType": "Solar",
        "location": "Ghana",
        "capacity": 75.0,
        "irr": 16.2,
        "esgScore": 8.4,
        "prediction": {
            "successProbability": 95,
            "riskLevel": "LOW",
            "confidence": 91
        },
        "processingTime": 4.0
    });

    let (status, created) = send(&app, "POST", "/api/predictions", Some(prediction)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(created["id"].as_str().unwrap().starts_with("pred_"));

    let (status, performance) = send(&app, "GET", "/api/models/performance", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(performance["totalPredictions"], 1);
    assert_eq!(performance["recentPerformance"]["averageConfidence"], 91.0);
    assert_eq!(performance["recentPerformance"]["riskDistribution"]["LOW"], 100);
}

#[tokio::test]
async fn test_invalid_prediction_is_rejected() {
    let (app, state, _dir) = setup_test_app().await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/predictions",
        Some(json!({ "projectType": "Solar" })),
    )
    .await;

    assert!(status.is_client_error());
    assert!(state.predictions.is_empty().await);
}

#[tokio::test]
async fn test_exports_write_report_files() {
    let (app, _state, dir) = setup_test_app().await;

    let (status, body) = send(&app, "POST", "/api/performance/export", None).await;
    assert_eq!(status, StatusCode::OK);
    let path = body["path"].as_str().unwrap();
    assert!(path.contains("performance-report-"));
    assert!(std::path::Path::new(path).starts_with(dir.path()));

    let (status, body) = send(&app, "POST", "/api/models/export", None).await;
    assert_eq!(status, StatusCode::OK);
    let report: Value =
        serde_json::from_str(&std::fs::read_to_string(body["path"].as_str().unwrap()).unwrap())
            .unwrap();
    assert_eq!(report["modelInfo"]["name"], "FinergyCloud XGBoost v2.1");
}

#[tokio::test]
async fn test_export_failure_returns_500() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("blocked");
    std::fs::write(&blocker, "x").unwrap();

    let config = ServerConfig {
        data_dir: blocker,
        ..Default::default()
    };
    let state = Arc::new(AppState::from_config(
        &config,
        Arc::new(FixedSampler::default()),
        HealthRegistry::new(),
    ));
    let app = create_router(state);

    let (status, body) = send(&app, "POST", "/api/performance/export", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("performance report"));
}
