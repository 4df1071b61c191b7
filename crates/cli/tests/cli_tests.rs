//! CLI integration tests

use std::process::{Command, Output};
use tempfile::TempDir;

/// Run the `ftm` binary with an isolated home directory
fn ftm(args: &[&str], home: &TempDir) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ftm"))
        .args(args)
        .env("HOME", home.path())
        .env_remove("FTM_API_URL")
        .env("NO_COLOR", "1")
        .output()
        .expect("Failed to execute ftm")
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let home = TempDir::new().unwrap();
    let output = ftm(&["--help"], &home);

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(stdout.contains("FinergyCloud telemetry"), "Should show app name");
    assert!(stdout.contains("stats"), "Should show stats command");
    assert!(stdout.contains("health"), "Should show health command");
    assert!(stdout.contains("benchmark"), "Should show benchmark command");
    assert!(stdout.contains("models"), "Should show models command");
    assert!(stdout.contains("export"), "Should show export command");
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let home = TempDir::new().unwrap();
    let output = ftm(&["--version"], &home);

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("ftm"), "Should show binary name");
}

#[test]
fn test_benchmark_help_lists_subcommands() {
    let home = TempDir::new().unwrap();
    let output = ftm(&["benchmark", "--help"], &home);

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("run"), "Should show run subcommand");
    assert!(stdout.contains("history"), "Should show history subcommand");
}

#[test]
fn test_export_help_shows_output_option() {
    let home = TempDir::new().unwrap();
    let output = ftm(&["export", "performance", "--help"], &home);

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("--output"), "Should show output option");
}

#[test]
fn test_invalid_format_rejected() {
    let home = TempDir::new().unwrap();
    let output = ftm(&["--format", "yaml", "stats"], &home);

    assert!(!output.status.success());
}

#[test]
fn test_stats_json_against_mock_server() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/api/performance/stats")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "totalRequests": 2,
                "averageResponseTime": 15.0,
                "medianResponseTime": 15.0,
                "p95ResponseTime": 20.0,
                "p99ResponseTime": 20.0,
                "errorRate": 0.0,
                "requestsPerSecond": 0.0000231,
                "endpointBreakdown": {
                    "/api/projects": { "count": 2, "avgResponseTime": 15.0 }
                },
                "memoryStats": { "rss": 40, "virtual": 300 },
                "uptimeSecs": 60.0
            }"#,
        )
        .create();

    let home = TempDir::new().unwrap();
    let url = server.url();
    let output = ftm(&["--api-url", &url, "--format", "json", "stats"], &home);

    mock.assert();
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["totalRequests"], 2);
    assert_eq!(json["endpointBreakdown"]["/api/projects"]["count"], 2);
}

#[test]
fn test_api_url_read_from_config_file() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/api/benchmarks")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("[]")
        .create();

    let home = TempDir::new().unwrap();
    let config_dir = home.path().join(".config").join("ftm");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(
        config_dir.join("config.json"),
        format!(r#"{{"api_url":"{}"}}"#, server.url()),
    )
    .unwrap();

    let output = ftm(&["--format", "json", "benchmark", "history"], &home);

    mock.assert();
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "[]");
}

#[test]
fn test_server_error_fails_command() {
    let mut server = mockito::Server::new();
    server
        .mock("POST", "/api/models/export")
        .with_status(500)
        .with_body(r#"{"error":"Failed to export model report"}"#)
        .create();

    let home = TempDir::new().unwrap();
    let url = server.url();
    let output = ftm(&["--api-url", &url, "export", "models"], &home);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to export model report"), "stderr: {stderr}");
}
