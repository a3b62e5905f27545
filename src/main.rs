//! CLI entry point for publishing a leaderboard CSV as a new snapshot.
//!
//! Reads the backend URL and service-role key from the environment (or a
//! `.env` file), loads the CSV, resolves airlines, and unless `--dry-run` is
//! given, creates, populates and activates the snapshot.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use leaderboard_ingest::config::BackendConfig;
use leaderboard_ingest::error::IngestError;
use leaderboard_ingest::infra::supabase::SupabaseBackend;
use leaderboard_ingest::ingest::{self, IngestOptions, IngestOutcome, parse_reporting_date};
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "leaderboard_ingest")]
#[command(about = "Ingest a leaderboard CSV into the backend as a new snapshot", long_about = None)]
struct Cli {
    /// Path to the leaderboard CSV file
    #[arg(long = "csv", value_name = "PATH")]
    csv_path: PathBuf,

    /// Snapshot label. Defaults to "<travel class> upload <UTC timestamp>"
    #[arg(long)]
    label: Option<String>,

    /// Travel class (e.g. Business). Falls back to the first row's travel_class
    #[arg(long)]
    travel_class: Option<String>,

    /// Reporting period start date (YYYY-MM-DD)
    #[arg(long)]
    reporting_start: Option<String>,

    /// Reporting period end date (YYYY-MM-DD)
    #[arg(long)]
    reporting_end: Option<String>,

    /// Optional notes stored on the snapshot
    #[arg(long)]
    notes: Option<String>,

    /// Parse the CSV and resolve airlines without writing anything
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok(); // Load .env file

    let _log_guard = match init_logging() {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("❌ {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("❌ {}", render_error(&e));
            ExitCode::FAILURE
        }
    }
}

/// `<stage>: <domain error>`. Domain messages already embed their source,
/// so the rest of the chain is not repeated.
fn render_error(e: &anyhow::Error) -> String {
    match e.downcast_ref::<IngestError>() {
        Some(cause) if e.to_string() != cause.to_string() => format!("{e}: {cause}"),
        Some(_) => e.to_string(),
        None => format!("{e:#}"),
    }
}

/// Colored stderr logging plus a JSON daily-rolling log file.
fn init_logging() -> Result<WorkerGuard> {
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/leaderboard_ingest.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("leaderboard_ingest.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive(LevelFilter::INFO.into()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive(LevelFilter::DEBUG.into()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .try_init()
        .context("failed to install tracing subscriber")?;

    Ok(guard)
}

async fn run(cli: Cli) -> Result<()> {
    let config = BackendConfig::from_env().context("reading backend configuration")?;
    let options = ingest_options(cli).context("reading command-line options")?;

    let backend = SupabaseBackend::connect(&config)
        .with_context(|| format!("connecting to {}", config.url()))?;
    info!(url = config.url(), dry_run = options.dry_run, "Starting leaderboard ingestion");

    let mut stdout = std::io::stdout();
    let outcome = ingest::run(&options, &backend, &mut stdout)
        .await
        .with_context(|| format!("ingesting {}", options.csv_path.display()))?;
    match outcome {
        IngestOutcome::DryRun { rows, .. } => info!(rows, "Dry run finished; nothing written"),
        IngestOutcome::Published { snapshot_id, rankings, .. } => {
            info!(%snapshot_id, rankings, "Snapshot published")
        }
    }
    Ok(())
}

fn ingest_options(cli: Cli) -> leaderboard_ingest::error::Result<IngestOptions> {
    Ok(IngestOptions {
        csv_path: cli.csv_path,
        label: cli.label,
        travel_class: cli.travel_class,
        reporting_start: cli
            .reporting_start
            .as_deref()
            .map(|v| parse_reporting_date("reporting-start", v))
            .transpose()?,
        reporting_end: cli
            .reporting_end
            .as_deref()
            .map(|v| parse_reporting_date("reporting-end", v))
            .transpose()?,
        notes: cli.notes,
        dry_run: cli.dry_run,
    })
}
