//! FinergyCloud telemetry CLI
//!
//! A command-line tool for reading request statistics, running model
//! benchmarks and exporting reports from the telemetry service.

mod client;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{benchmark, export, stats};

/// FinergyCloud telemetry CLI
#[derive(Parser)]
#[command(name = "ftm")]
#[command(author, version, about = "CLI for the FinergyCloud telemetry service", long_about = None)]
pub struct Cli {
    /// API endpoint URL (can also be set via FTM_API_URL or ~/.config/ftm/config.json)
    #[arg(long, env = "FTM_API_URL")]
    pub api_url: Option<String>,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show request statistics for the last 24 hours
    Stats,

    /// Show collector component health
    Health,

    /// Run or list scoring benchmarks
    #[command(subcommand)]
    Benchmark(BenchmarkCommands),

    /// Show prediction statistics and the latest benchmark
    Models,

    /// Export a report on the server
    #[command(subcommand)]
    Export(ExportCommands),
}

#[derive(Subcommand)]
pub enum BenchmarkCommands {
    /// Run a synthetic benchmark now
    Run,

    /// Show previous benchmark runs
    History,
}

#[derive(Subcommand)]
pub enum ExportCommands {
    /// Export the performance report
    Performance {
        /// Copy the written report to this path
        #[arg(long, short)]
        output: Option<String>,
    },

    /// Export the model performance report
    Models {
        /// Copy the written report to this path
        #[arg(long, short)]
        output: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let api_url = config::Config::load()?.resolve_api_url(cli.api_url);
    let client = client::ApiClient::new(&api_url)?;

    match cli.command {
        Commands::Stats => stats::show_stats(&client, cli.format).await?,
        Commands::Health => stats::show_health(&client, cli.format).await?,
        Commands::Benchmark(benchmark_cmd) => match benchmark_cmd {
            BenchmarkCommands::Run => benchmark::run_benchmark(&client, cli.format).await?,
            BenchmarkCommands::History => benchmark::show_history(&client, cli.format).await?,
        },
        Commands::Models => benchmark::show_models(&client, cli.format).await?,
        Commands::Export(export_cmd) => match export_cmd {
            ExportCommands::Performance { output } => {
                export::export_report(&client, export::ReportKind::Performance, output, cli.format)
                    .await?
            }
            ExportCommands::Models { output } => {
                export::export_report(&client, export::ReportKind::Models, output, cli.format)
                    .await?
            }
        },
    }

    Ok(())
}
