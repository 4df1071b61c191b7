//! FinergyCloud telemetry collector
//!
//! Tracks request latency and process health for the platform API, runs
//! synthetic benchmarks of the investment scoring function and writes
//! snapshots and reports to disk.

use anyhow::{Context, Result};
use std::sync::Arc;
use telemetry_lib::{
    HealthCollectionLoop, HealthRegistry, FlushLoop, ProcessSampler, StructuredLogger,
};
use telemetry_server::{api, AppState, ServerConfig, SERVICE_NAME};
use tokio::sync::broadcast;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // JSON logs on stderr, level from RUST_LOG
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json().with_writer(std::io::stderr))
        .init();

    let config = ServerConfig::load()?;
    info!(
        port = config.listen_port,
        data_dir = %config.data_dir.display(),
        "Telemetry collector configured"
    );

    let health_registry = HealthRegistry::with_default_components().await;

    let logger = StructuredLogger::new(SERVICE_NAME);
    logger.log_startup(VERSION, &config.data_dir);

    let state = Arc::new(AppState::from_config(
        &config,
        Arc::new(ProcessSampler::new()),
        health_registry.clone(),
    ));

    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    let health_loop = HealthCollectionLoop::new(
        state.monitor.clone(),
        health_registry.clone(),
        config.health_interval(),
    );
    let health_handle = tokio::spawn(health_loop.run(shutdown_tx.subscribe()));

    let flush_loop = Arc::new(
        FlushLoop::builder()
            .monitor(state.monitor.clone())
            .store(state.store.clone())
            .health(health_registry.clone())
            .logger(logger.clone())
            .interval(config.flush_interval())
            .build()?,
    );
    let flush_handle = tokio::spawn(flush_loop.clone().run(shutdown_tx.subscribe()));

    let mut server_shutdown = shutdown_tx.subscribe();
    let mut api_handle = tokio::spawn(api::serve(config.listen_port, state, async move {
        let _ = server_shutdown.recv().await;
    }));

    health_registry.set_ready(true).await;

    tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for shutdown signal")?;
            logger.log_shutdown("SIGINT received");
        }
        result = &mut api_handle => {
            match result {
                Ok(Ok(())) => logger.log_shutdown("API server stopped"),
                Ok(Err(e)) => error!(error = %format!("{e:#}"), "API server failed"),
                Err(e) => error!(error = %e, "API server task panicked"),
            }
        }
    }

    health_registry.set_ready(false).await;
    let _ = shutdown_tx.send(());

    if !api_handle.is_finished() {
        if let Ok(Err(e)) = api_handle.await {
            error!(error = %format!("{e:#}"), "API server failed during shutdown");
        }
    }
    if let Err(e) = health_handle.await {
        error!(error = %e, "Health collection task panicked");
    }
    // Waits for the final flush
    if let Err(e) = flush_handle.await {
        error!(error = %e, "Flush task panicked");
    }

    let stats = flush_loop.stats();
    info!(
        flushes = stats.flushes,
        failures = stats.failures,
        "Telemetry collector stopped"
    );

    Ok(())
}
