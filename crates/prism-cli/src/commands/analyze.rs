use std::process::ExitCode;

use anyhow::Context;
use prism_config::PrismConfig;
use tracing::info;

use crate::cli::{AnalyzeArgs, OutputFormat};
use crate::error::CliError;
use crate::report::WarningReport;
use crate::ui;

/// Analyze the configured entrypoints (or the whole package) and print
/// their warnings. Fails the process when any warning is an error.
pub async fn execute(config: &PrismConfig, args: &AnalyzeArgs, quiet: bool) -> anyhow::Result<ExitCode> {
    let analyzer = super::analyzer(config)?;

    let analysis = if config.entrypoints.is_empty() {
        info!(root = %config.root.display(), "analyzing package");
        analyzer.analyze_package().await.map_err(CliError::from)?
    } else {
        analyzer.analyze(config.entrypoints.as_slice()).await
    };

    let report = WarningReport::new(&analysis, config.external_packages);
    match args.format {
        OutputFormat::Text => {
            print!("{}", report.render_text());
            if !quiet {
                if report.has_errors() {
                    ui::error(&report.summary());
                } else {
                    ui::success(&report.summary());
                }
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
            println!("{json}");
        }
    }

    Ok(if report.has_errors() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
