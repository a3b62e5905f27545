//! The single domain error raised by every stage of an ingestion run.

use chrono::NaiveDate;

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, IngestError>;

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Environment variable {0} is required.")]
    MissingEnv(&'static str),

    #[error("Invalid backend URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Invalid header '{name}': {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("Failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV file has no header row.")]
    NoHeaderRow,

    #[error("CSV contains no data rows.")]
    NoDataRows,

    #[error("Travel class must be provided via --travel-class or in the CSV.")]
    MissingTravelClass,

    #[error("Row {line} is missing '{field}'. Each row must contain 'airline_iata' and 'category' columns.")]
    MissingField { line: u64, field: &'static str },

    #[error("Row for airline {iata} / category {category} is missing 'leaderboard_score'.")]
    MissingScore { iata: String, category: String },

    #[error("Airline with IATA code '{0}' not found in the 'airlines' table.")]
    UnknownAirline(String),

    #[error("No airline mapping found for IATA code '{0}'.")]
    UnmappedAirline(String),

    #[error("Duplicate ranking for airline {iata} / category {category}.")]
    DuplicateRanking { iata: String, category: String },

    #[error("Failed to resolve ranking_id for airline {iata} / category {category}.")]
    UnresolvedRanking { iata: String, category: String },

    #[error("Invalid date format for --{flag}: {value}")]
    InvalidDate { flag: &'static str, value: String },

    #[error("Reporting period start {start} is after its end {end}.")]
    InvalidReportingPeriod { start: NaiveDate, end: NaiveDate },

    #[error("Backend request failed ({status}): {body}")]
    Backend { status: u16, body: String },

    #[error("Backend returned no rows for {0}.")]
    EmptyResponse(&'static str),

    #[error("Backend request could not be sent: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected backend response: {0}")]
    Decode(#[from] serde_json::Error),
}
