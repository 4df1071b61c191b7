//! Request statistics and collector health commands

use anyhow::Result;
use colored::Colorize;
use tabled::Tabled;

use crate::client::{ApiClient, HealthResponse, PerformanceStats};
use crate::output::{
    color_error_rate, color_status, format_ms, format_timestamp, format_uptime, print_json,
    print_table, OutputFormat,
};

/// Row for the per-endpoint table
#[derive(Tabled)]
struct EndpointRow {
    #[tabled(rename = "Endpoint")]
    endpoint: String,
    #[tabled(rename = "Requests")]
    count: u64,
    #[tabled(rename = "Avg Response")]
    avg_response_time: String,
}

/// Row for the component health table
#[derive(Tabled)]
struct ComponentRow {
    #[tabled(rename = "Component")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Failures")]
    consecutive_failures: u32,
    #[tabled(rename = "Checked")]
    checked_at: String,
    #[tabled(rename = "Message")]
    message: String,
}

/// Show request statistics over the server's window
pub async fn show_stats(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let stats: PerformanceStats = client.get("api/performance/stats").await?;

    match format {
        OutputFormat::Json => print_json(&stats)?,
        OutputFormat::Table => {
            println!("{}", "Performance Statistics".bold());
            println!("{}", "=".repeat(50));
            println!("Total requests:         {}", stats.total_requests);
            println!("Requests/second:        {:.4}", stats.requests_per_second);
            println!("Error rate:             {}", color_error_rate(stats.error_rate));
            println!("Uptime:                 {}", format_uptime(stats.uptime_secs));
            println!();

            println!("{}", "Response Times".bold());
            println!("{}", "-".repeat(50));
            println!("Average:                {}", format_ms(stats.average_response_time));
            println!("Median:                 {}", format_ms(stats.median_response_time));
            println!("P95:                    {}", format_ms(stats.p95_response_time));
            println!("P99:                    {}", format_ms(stats.p99_response_time));
            println!();

            println!("{}", "Memory".bold());
            println!("{}", "-".repeat(50));
            println!("Resident:               {} MB", stats.memory_stats.rss);
            println!("Virtual:                {} MB", stats.memory_stats.virtual_mem);
            println!();

            let rows: Vec<EndpointRow> = stats
                .endpoint_breakdown
                .iter()
                .map(|(endpoint, s)| EndpointRow {
                    endpoint: endpoint.clone(),
                    count: s.count,
                    avg_response_time: format_ms(s.avg_response_time),
                })
                .collect();
            println!("{}", "Endpoints".bold());
            print_table(&rows);
        }
    }

    Ok(())
}

/// Show collector component health
pub async fn show_health(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let (_status, health): (_, HealthResponse) = client.get_with_status("healthz").await?;

    match format {
        OutputFormat::Json => print_json(&health)?,
        OutputFormat::Table => {
            println!("Overall: {}", color_status(&health.status).bold());
            println!();

            let rows: Vec<ComponentRow> = health
                .components
                .iter()
                .map(|(name, c)| ComponentRow {
                    name: name.clone(),
                    status: color_status(&c.status),
                    consecutive_failures: c.consecutive_failures,
                    checked_at: format_timestamp(&c.checked_at),
                    message: c.message.clone().unwrap_or_else(|| "-".to_string()),
                })
                .collect();
            print_table(&rows);
        }
    }

    Ok(())
}
