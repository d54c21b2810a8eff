//! imgdrop CLI: submit images to the ingestion backend and follow their jobs.
//!
//! Configured through IMGDROP_* environment variables (see `IngestConfig::from_env`).

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use imgdrop_api_client::{ApiClient, Reconciler, Refresh};
use imgdrop_cli::{
    format_failed, format_job_table, format_report, init_tracing, load_candidate, submit_failure,
    OutputFormat,
};
use imgdrop_core::{Listing, ListingOrder, ValidationError};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "imgdrop", about = "Batch image ingestion client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a single image
    Upload {
        /// Path to the image
        file: PathBuf,
        /// Declared media type (default: inferred from the extension)
        #[arg(long = "type")]
        content_type: Option<String>,
    },
    /// Upload several images as one batch
    UploadBatch {
        /// Paths to the images, submitted in this order
        files: Vec<PathBuf>,
        /// Poll the listing until every uploaded file has finished processing
        #[arg(long)]
        watch: bool,
        /// Seconds between listing polls
        #[arg(long, default_value = "2")]
        interval_secs: u64,
        /// Stop polling after this many listings
        #[arg(long, default_value = "30")]
        max_polls: u32,
    },
    /// List ingestion jobs
    List {
        /// Reverse the backend order
        #[arg(long)]
        reverse: bool,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Poll the listing and print job changes
    Watch {
        /// Reverse the backend order
        #[arg(long)]
        reverse: bool,
        /// Seconds between listing polls
        #[arg(long, default_value = "2")]
        interval_secs: u64,
        /// Stop after this many listings
        #[arg(long, default_value = "30")]
        max_polls: u32,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

fn order(reverse: bool) -> ListingOrder {
    if reverse {
        ListingOrder::Reversed
    } else {
        ListingOrder::BackendOrder
    }
}

fn warn_if_degraded(listing: &Listing) {
    if let Some(reason) = listing.degrade_reason() {
        eprintln!("Warning: job listing unavailable ({}), showing no jobs", reason);
    }
}

fn print_refresh(refresh: &Refresh) {
    warn_if_degraded(&refresh.listing);
    for line in format_report(&refresh.report) {
        println!("{}", line);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let client = ApiClient::from_env()
        .context("Failed to create API client. Check the IMGDROP_* environment variables")?;

    match cli.command {
        Commands::Upload { file, content_type } => {
            let candidate = load_candidate(&file, content_type.as_deref())?;
            let acceptance = client
                .submit_single(candidate)
                .await
                .map_err(submit_failure)?;
            print_json(&acceptance)?;
        }
        Commands::UploadBatch {
            files,
            watch,
            interval_secs,
            max_polls,
        } => {
            if files.is_empty() {
                return Err(submit_failure(ValidationError::EmptyBatch.into()));
            }
            let candidates = files
                .iter()
                .map(|path| load_candidate(path, None))
                .collect::<anyhow::Result<Vec<_>>>()?;

            let mut reconciler = Reconciler::new(client, ListingOrder::BackendOrder);
            let (_, acceptance) = reconciler
                .submit(candidates)
                .await
                .map_err(submit_failure)?;
            print_json(&acceptance)?;

            if watch {
                let refresh = reconciler
                    .poll_until_finished(Duration::from_secs(interval_secs), max_polls)
                    .await;
                warn_if_degraded(&refresh.listing);
                print_json(&refresh.ledger)?;

                if let Some(status) = &refresh.ledger {
                    for line in format_failed(status) {
                        eprintln!("{}", line);
                    }
                    if !status.is_finished() {
                        eprintln!(
                            "Warning: {} file(s) not yet finished after {} poll(s)",
                            status.unfinished(),
                            max_polls
                        );
                    }
                }
            }
        }
        Commands::List { reverse, format } => {
            let listing = client.fetch_presented(order(reverse)).await;
            warn_if_degraded(&listing);
            match format {
                OutputFormat::Json => print_json(&listing.into_jobs())?,
                OutputFormat::Table => print!("{}", format_job_table(listing.jobs())),
            }
        }
        Commands::Watch {
            reverse,
            interval_secs,
            max_polls,
        } => {
            let mut reconciler = Reconciler::new(client, order(reverse));
            for poll in 0..max_polls.max(1) {
                if poll > 0 {
                    tokio::time::sleep(Duration::from_secs(interval_secs)).await;
                }
                let refresh = reconciler.refresh().await;
                print_refresh(&refresh);
            }
            let counts = reconciler.registry().counts();
            eprintln!(
                "{} active, {} ready, {} failed",
                counts.active, counts.ready, counts.failed
            );
        }
    }

    Ok(())
}
