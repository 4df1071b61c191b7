//! CLI command implementations

pub mod benchmark;
pub mod export;
pub mod stats;
