//! LCX engine CLI
//!
//! Builds a context report for one address or listing URL and prints it as
//! JSON. Ctrl+C cancels the in-flight request.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lcx_common::config::TomlConfig;
use lcx_common::logging::{init_tracing, with_startup_logging};
use lcx_engine::types::{ReportRequest, DEFAULT_RADIUS_METERS};
use lcx_engine::{ContextError, ContextReportService};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Command-line arguments for lcx-engine
#[derive(Parser, Debug)]
#[command(name = "lcx-engine")]
#[command(about = "Location context enrichment for Dutch addresses")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a context report and print it as JSON
    Report {
        /// Address text or listing URL
        input: String,

        /// Search radius in meters
        #[arg(short, long, default_value_t = DEFAULT_RADIUS_METERS)]
        radius: i32,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = with_startup_logging(|| TomlConfig::load(args.config.as_deref()))
        .context("Failed to load configuration")?;
    init_tracing(&config.logging).context("Failed to initialise logging")?;

    match args.command {
        Command::Report { input, radius, pretty } => {
            let service =
                ContextReportService::from_config(&config.enrichment).context("Failed to build report service")?;

            let cancel = CancellationToken::new();
            tokio::spawn(cancel_on_ctrl_c(cancel.clone()));

            let request = ReportRequest::new(input, radius);
            let report = match service.build(&request, &cancel).await {
                Ok(report) => report,
                Err(ContextError::Cancelled) => {
                    warn!("Report request cancelled");
                    return Ok(());
                }
                Err(e) => return Err(e).context("Failed to build context report"),
            };

            info!(composite_score = report.composite_score, "Report complete");

            let json = if pretty {
                serde_json::to_string_pretty(report.as_ref())
            } else {
                serde_json::to_string(report.as_ref())
            }
            .context("Failed to serialize report")?;
            println!("{}", json);
        }
    }

    Ok(())
}

async fn cancel_on_ctrl_c(cancel: CancellationToken) {
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Received Ctrl+C, cancelling request");
            cancel.cancel();
        }
        Err(e) => warn!(error = %e, "Failed to install Ctrl+C handler"),
    }
}
