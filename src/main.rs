//! news-collector binary
//!
//! Thin CLI over the library [`Pipeline`]: loads `.env`, assembles the
//! configuration from defaults, environment, and flags, runs one ingestion
//! pass, prints the execution summary, and exits 0 on success.

use clap::Parser;
use news_collector::{Config, Pipeline, RunStatus, RunSummary};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Command-line arguments
///
/// Flags override the corresponding environment variables (`NEWS_API_KEY`,
/// `SEARCH_QUERY`, `DRY_RUN`) and built-in defaults. `RUST_LOG` controls
/// log filtering.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Fetch and clean only; skip storage, retention, and the report
    #[arg(long)]
    dry_run: bool,

    /// Search query sent to the news API
    #[arg(short, long)]
    query: Option<String>,

    /// How many days back the search window reaches
    #[arg(long)]
    days_back: Option<i64>,

    /// SQLite database path
    #[arg(long)]
    database: Option<PathBuf>,

    /// Directory the CSV reports are written to
    #[arg(long)]
    reports_dir: Option<PathBuf>,

    /// Delete stored articles published more than this many days ago
    #[arg(long)]
    retention_days: Option<i64>,
}

impl Cli {
    /// Overlay the flags onto an environment-derived config
    fn into_config(self) -> Config {
        let mut config = Config::from_env();

        if self.dry_run {
            config.dry_run = true;
        }
        if let Some(query) = self.query {
            config.api.query = query;
        }
        if let Some(days_back) = self.days_back {
            config.api.days_back = days_back;
        }
        if let Some(database) = self.database {
            config.storage.database_path = database;
        }
        if let Some(reports_dir) = self.reports_dir {
            config.report.reports_dir = reports_dir;
        }
        if let Some(retention_days) = self.retention_days {
            config.storage.retention_days = retention_days;
        }

        config
    }
}

/// Initialize tracing: human-readable console output plus a daily-rolling
/// JSON log file under `logs/`
///
/// The returned guard must stay alive for the program's lifetime so the
/// non-blocking writer flushes on exit.
fn init_logging() -> tracing_appender::non_blocking::WorkerGuard {
    let _ = std::fs::create_dir_all("logs");

    let file_appender = tracing_appender::rolling::daily("logs", "news_collector.log");
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer().json().with_writer(non_blocking_writer);
    let console_layer = fmt::layer().with_writer(std::io::stdout);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    guard
}

fn print_summary(summary: &RunSummary) {
    println!();
    println!("==================== EXECUTION SUMMARY ====================");
    println!(
        "Status:       {}",
        match summary.status {
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
        }
    );
    if summary.dry_run {
        println!("Mode:         dry run (no storage, retention, or report)");
    }
    println!("Started:      {}", summary.started_at.to_rfc3339());
    println!(
        "Duration:     {:.1}s",
        summary.elapsed().num_milliseconds() as f64 / 1000.0
    );
    println!("Fetched:      {}", summary.fetched);
    println!("Cleaned:      {}", summary.cleaned);
    println!("Rejected:     {}", summary.rejected);
    println!("Inserted:     {}", summary.inserted);
    println!("Skipped:      {}", summary.skipped);
    println!("Deleted:      {}", summary.deleted);
    if let Some(path) = &summary.report_path {
        println!("Report:       {}", path.display());
    }
    if let Some(stage) = summary.failed_stage {
        println!("Failed stage: {stage}");
    }
    if let Some(error) = &summary.error {
        println!("Error:        {error}");
    }
    println!("===========================================================");
}

#[tokio::main]
async fn main() -> ExitCode {
    // .env is optional; a missing file is not an error
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let _guard = init_logging();

    let config = cli.into_config();
    let pipeline = match Pipeline::new(config) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            tracing::error!(error = %e, "Failed to initialize pipeline");
            return ExitCode::FAILURE;
        }
    };

    let summary = pipeline.run().await;
    print_summary(&summary);

    match summary.status {
        RunStatus::Completed => ExitCode::SUCCESS,
        RunStatus::Failed => ExitCode::FAILURE,
    }
}
