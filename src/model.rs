//! Records exchanged with the leaderboard backend.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Snapshot `source` value for CSV uploads.
pub const MANUAL_UPLOAD_SOURCE: &str = "manual_upload";

/// Primary key of a backend row, passed through exactly as the backend sent it.
///
/// Tables may be keyed by integers or by text (UUIDs), so neither is assumed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Number(n) => write!(f, "{n}"),
            RecordId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RecordId {
    fn from(n: i64) -> Self {
        RecordId::Number(n)
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        RecordId::Text(s)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        RecordId::Text(s.to_string())
    }
}

/// An entry from the airline directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirlineInfo {
    pub id: RecordId,
    pub name: String,
    pub iata_code: String,
    #[serde(default)]
    pub icao_code: Option<String>,
}

/// Payload for creating a snapshot. Absent optional fields are omitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewSnapshot {
    pub label: String,
    pub travel_class: String,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reporting_period_start: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reporting_period_end: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A snapshot as echoed back by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    pub id: RecordId,
    pub label: String,
    pub travel_class: String,
}

/// One ranking row to insert. Missing optional numerics serialize as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewRanking {
    pub snapshot_id: RecordId,
    pub airline_id: RecordId,
    pub category: String,
    pub travel_class: String,
    pub leaderboard_rank: i64,
    pub leaderboard_score: f64,
    pub avg_rating: Option<f64>,
    pub review_count: Option<i64>,
    pub positive_count: Option<i64>,
    pub negative_count: Option<i64>,
    pub positive_ratio: Option<f64>,
    pub is_active: bool,
}

/// Identity of an inserted ranking row, used to link metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingRef {
    pub id: RecordId,
    pub airline_id: RecordId,
    pub category: String,
    #[serde(default)]
    pub travel_class: Option<String>,
}

/// A named numeric breakdown attached to a ranking row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewMetric {
    pub ranking_id: RecordId,
    pub metric_key: String,
    pub metric_value: f64,
}
