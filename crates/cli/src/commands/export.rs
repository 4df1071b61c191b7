//! Report export commands

use anyhow::{Context, Result};

use crate::client::{ApiClient, ExportResponse};
use crate::output::{print_info, print_json, print_success, print_warning, OutputFormat};

/// Which report the server should write
#[derive(Debug, Clone, Copy)]
pub enum ReportKind {
    Performance,
    Models,
}

impl ReportKind {
    fn path(&self) -> &'static str {
        match self {
            ReportKind::Performance => "api/performance/export",
            ReportKind::Models => "api/models/export",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            ReportKind::Performance => "Performance report",
            ReportKind::Models => "Model performance report",
        }
    }
}

/// Ask the server to export a report, optionally copying it locally
///
/// The report is written on the server host; `--output` only works when the
/// CLI runs on the same host (or shares the data directory).
pub async fn export_report(
    client: &ApiClient,
    kind: ReportKind,
    output: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let exported: ExportResponse = client.post(kind.path()).await?;

    if let Some(output_path) = &output {
        std::fs::copy(&exported.path, output_path).with_context(|| {
            format!(
                "Report was written to {} but could not be copied to {}",
                exported.path, output_path
            )
        })?;
    }

    match format {
        OutputFormat::Json => print_json(&exported)?,
        OutputFormat::Table => {
            print_success(&format!("{} written to {}", kind.label(), exported.path));
            match &output {
                Some(output_path) => print_info(&format!("Copied to {}", output_path)),
                None => print_warning("The report lives on the server host; use --output to copy it"),
            }
        }
    }

    Ok(())
}
