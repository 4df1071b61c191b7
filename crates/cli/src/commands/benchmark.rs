//! Benchmark and model performance commands

use anyhow::Result;
use colored::Colorize;
use tabled::Tabled;

use crate::client::{ApiClient, BenchmarkResult, ModelPerformance};
use crate::output::{
    color_score, format_ms, format_percent, format_timestamp, print_info, print_json,
    print_success, print_table, OutputFormat,
};

/// Row for the benchmark history table
#[derive(Tabled)]
struct BenchmarkRow {
    #[tabled(rename = "Run At")]
    timestamp: String,
    #[tabled(rename = "Test Set")]
    test_set_size: u64,
    #[tabled(rename = "Accuracy")]
    accuracy: String,
    #[tabled(rename = "Precision")]
    precision: String,
    #[tabled(rename = "Recall")]
    recall: String,
    #[tabled(rename = "F1")]
    f1_score: String,
    #[tabled(rename = "Avg Latency")]
    average_latency: String,
}

impl From<&BenchmarkResult> for BenchmarkRow {
    fn from(result: &BenchmarkResult) -> Self {
        Self {
            timestamp: format_timestamp(&result.timestamp),
            test_set_size: result.test_set_size,
            accuracy: color_score(result.accuracy),
            precision: format_percent(result.precision),
            recall: format_percent(result.recall),
            f1_score: color_score(result.f1_score),
            average_latency: format_ms(result.average_latency),
        }
    }
}

fn print_benchmark(result: &BenchmarkResult) {
    println!("{}", "Benchmark Result".bold());
    println!("{}", "=".repeat(50));
    println!("Test set size:          {}", result.test_set_size);
    println!("Accuracy:               {}", color_score(result.accuracy));
    println!("Precision:              {}", format_percent(result.precision));
    println!("Recall:                 {}", format_percent(result.recall));
    println!("F1 score:               {}", color_score(result.f1_score));
    println!();

    println!("{}", "Confusion Matrix".bold());
    println!("{}", "-".repeat(50));
    println!(
        "TP {:>6}   FP {:>6}",
        result.true_positives, result.false_positives
    );
    println!(
        "FN {:>6}   TN {:>6}",
        result.false_negatives, result.true_negatives
    );
    println!();

    println!("{}", "Scoring Latency".bold());
    println!("{}", "-".repeat(50));
    println!("Average:                {}", format_ms(result.average_latency));
    println!("P50:                    {}", format_ms(result.p50_latency_ms));
    println!("P95:                    {}", format_ms(result.p95_latency_ms));
    println!("P99:                    {}", format_ms(result.p99_latency_ms));
    println!();

    println!(
        "Model size: {} MB, cross-validation score: {}",
        result.model_size,
        format_percent(result.cross_validation_score)
    );
    println!("Run at: {}", format_timestamp(&result.timestamp).dimmed());
}

/// Trigger a benchmark run on the server
pub async fn run_benchmark(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let result: BenchmarkResult = client.post("api/benchmarks/run").await?;

    match format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Table => {
            print_success("Benchmark completed");
            println!();
            print_benchmark(&result);
        }
    }

    Ok(())
}

/// Show retained benchmark runs, oldest first
pub async fn show_history(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let history: Vec<BenchmarkResult> = client.get("api/benchmarks").await?;

    match format {
        OutputFormat::Json => print_json(&history)?,
        OutputFormat::Table => {
            if history.is_empty() {
                print_info("No benchmark runs yet. Start one with `ftm benchmark run`.");
                return Ok(());
            }
            let rows: Vec<BenchmarkRow> = history.iter().map(BenchmarkRow::from).collect();
            print_table(&rows);
        }
    }

    Ok(())
}

/// Show prediction statistics and the latest benchmark
pub async fn show_models(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let performance: ModelPerformance = client.get("api/models/performance").await?;

    match format {
        OutputFormat::Json => print_json(&performance)?,
        OutputFormat::Table => {
            let recent = &performance.recent_performance;
            let risk = &recent.risk_distribution;

            println!("{}", "Model Performance".bold());
            println!("{}", "=".repeat(50));
            println!("Total predictions:      {}", performance.total_predictions);
            println!(
                "Avg processing time:    {}",
                format_ms(recent.average_processing_time)
            );
            println!("Avg confidence:         {:.1}%", recent.average_confidence);
            println!(
                "Risk distribution:      {} {}%  {} {}%  {} {}%",
                "LOW".green(),
                risk.low,
                "MEDIUM".yellow(),
                risk.medium,
                "HIGH".red(),
                risk.high
            );
            println!();

            match &performance.latest_benchmark {
                Some(latest) => print_benchmark(latest),
                None => print_info("No benchmark runs yet"),
            }
        }
    }

    Ok(())
}
