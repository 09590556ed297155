// Main entry point for the jobradar harvest binary

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use harvester::{
    build_sources, default_file_name, run_once, CsvHistory, DeltaSnapshot, NoopNotifier,
    RunConfig, StopSignal,
};

/// Scrape the enabled job boards once and append new postings to the ledger.
#[derive(Debug, Parser)]
#[command(name = "jobradar", about = "Incremental job posting harvester")]
struct Args {
    /// Settings file maintained by the dashboard collaborator
    #[arg(long, default_value = "scraper_settings.json")]
    settings: PathBuf,

    /// Ledger CSV path; defaults to a date and time-of-day derived name
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Delta snapshot path, overwritten with each run's new postings
    #[arg(long, default_value = "new_jobs_temp.json")]
    snapshot: PathBuf,

    /// Stop marker file checked between fetch stages
    #[arg(long, default_value = "STOP_SCRAPE")]
    stop_file: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,harvester=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    // Load configuration
    let config = RunConfig::load(&args.settings).context("Failed to load settings")?;
    let ledger_path = args.csv.unwrap_or_else(|| {
        PathBuf::from(default_file_name(
            &config.file_name_prefix,
            chrono::Local::now(),
        ))
    });

    tracing::info!(
        ledger = %ledger_path.display(),
        search_term = %config.search_term,
        boards = ?config.scrape_from,
        "Starting jobradar run"
    );

    let sources = build_sources(&config).context("Failed to build board clients")?;
    let store = CsvHistory::open(&ledger_path)
        .await
        .context("Failed to open history ledger")?;
    let snapshot = DeltaSnapshot::new(&args.snapshot);

    // Observe both the collaborator's stop marker and Ctrl-C.
    let stop = StopSignal::with_sentinel(&args.stop_file);
    {
        let stop = stop.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupt received, finishing the current stage then stopping");
                stop.stop();
            }
        });
    }

    let report = run_once(&config, &sources, &store, Some(&snapshot), &NoopNotifier, &stop)
        .await
        .context("Harvest run failed")?;

    if report.stopped_early {
        tracing::warn!("Run stopped early by the stop signal");
    }
    for board in &report.failed_sources {
        tracing::warn!(board = %board, "Board failed this run");
    }
    tracing::info!(
        fetched = report.fetched,
        matched = report.matched,
        new_postings = report.new_postings,
        possibly_truncated = report.possibly_truncated,
        "Run complete"
    );

    Ok(())
}
