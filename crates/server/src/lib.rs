//! HTTP service around the telemetry collector

pub mod api;
pub mod config;
pub mod tracking;

pub use api::{create_router, AppState, SERVICE_NAME};
pub use config::ServerConfig;
