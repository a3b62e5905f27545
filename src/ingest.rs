//! End-to-end ingestion run: load, validate, resolve, then publish or preview.

use std::io::Write;
use std::path::PathBuf;

use chrono::{NaiveDate, Utc};
use tracing::info;

use crate::airlines::AirlineLookup;
use crate::error::{IngestError, Result};
use crate::loader::load_csv;
use crate::metrics::detect_metric_columns;
use crate::model::{MANUAL_UPLOAD_SOURCE, NewSnapshot, RecordId};
use crate::output::{write_preview, write_success};
use crate::publish::{RankCounters, SnapshotPublisher, prepare_rankings, require_identity_fields};
use crate::services::backend::LeaderboardBackend;

/// Operator-supplied settings for one run.
#[derive(Debug, Clone, Default)]
pub struct IngestOptions {
    pub csv_path: PathBuf,
    pub label: Option<String>,
    pub travel_class: Option<String>,
    pub reporting_start: Option<NaiveDate>,
    pub reporting_end: Option<NaiveDate>,
    pub notes: Option<String>,
    pub dry_run: bool,
}

/// What a successful run did.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    DryRun {
        rows: usize,
        metric_columns: Vec<String>,
    },
    Published {
        snapshot_id: RecordId,
        label: String,
        travel_class: String,
        rankings: usize,
    },
}

/// Parses a `YYYY-MM-DD` CLI date. `flag` names the option in the error.
pub fn parse_reporting_date(flag: &'static str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| IngestError::InvalidDate {
        flag,
        value: value.to_string(),
    })
}

/// Rejects a reporting period whose start is after its end.
pub fn check_reporting_period(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<()> {
    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            return Err(IngestError::InvalidReportingPeriod { start, end });
        }
    }
    Ok(())
}

fn default_label(travel_class: &str) -> String {
    format!("{travel_class} upload {}", Utc::now().format("%Y-%m-%d %H:%M:%S"))
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Runs one ingestion against `backend`, writing operator messages to `out`.
///
/// Nothing is written to the backend before every row has been validated.
/// In dry-run mode only airline lookups are issued.
#[tracing::instrument(skip_all, fields(csv = %options.csv_path.display(), dry_run = options.dry_run))]
pub async fn run<B, W>(options: &IngestOptions, backend: &B, out: &mut W) -> Result<IngestOutcome>
where
    B: LeaderboardBackend + ?Sized,
    W: Write,
{
    check_reporting_period(options.reporting_start, options.reporting_end)?;

    let csv = load_csv(&options.csv_path)?;
    if csv.rows.is_empty() {
        return Err(IngestError::NoDataRows);
    }
    info!(rows = csv.rows.len(), columns = csv.headers.len(), "CSV parsed");

    let travel_class = non_blank(&options.travel_class)
        .or_else(|| csv.rows[0].get("travel_class"))
        .ok_or(IngestError::MissingTravelClass)?
        .to_string();

    require_identity_fields(&csv.rows)?;
    let metric_columns = detect_metric_columns(&csv.headers);
    info!(?metric_columns, "Metric columns detected");

    let mut airlines = AirlineLookup::new();
    airlines
        .resolve(backend, &AirlineLookup::codes_in(&csv.rows))
        .await?;

    if options.dry_run {
        write_preview(out, &csv.rows, &metric_columns)?;
        return Ok(IngestOutcome::DryRun {
            rows: csv.rows.len(),
            metric_columns,
        });
    }

    let mut counters = RankCounters::new();
    let rankings = prepare_rankings(
        &csv.rows,
        &airlines,
        &travel_class,
        &metric_columns,
        &mut counters,
    )?;

    let label = non_blank(&options.label)
        .map(str::to_string)
        .unwrap_or_else(|| default_label(&travel_class));
    let snapshot = NewSnapshot {
        label: label.clone(),
        travel_class: travel_class.clone(),
        source: MANUAL_UPLOAD_SOURCE.to_string(),
        reporting_period_start: options.reporting_start,
        reporting_period_end: options.reporting_end,
        notes: non_blank(&options.notes).map(str::to_string),
    };

    let record = SnapshotPublisher::new(backend)
        .publish(&snapshot, &rankings)
        .await?;

    write_success(out, &label, &record.id, &travel_class)?;
    info!(snapshot_id = %record.id, rankings = rankings.len(), "Leaderboard ingestion completed");

    Ok(IngestOutcome::Published {
        snapshot_id: record.id,
        label,
        travel_class,
        rankings: rankings.len(),
    })
}
