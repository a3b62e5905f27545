//! Turning loaded rows into ranking and metric records and publishing them
//! as a new leaderboard snapshot.
//!
//! Publication is two-phase on the client side only: [`prepare_rankings`]
//! validates every row without touching the network, then
//! [`SnapshotPublisher::publish`] performs the backend writes in order.
//! There is no rollback; a failure after the snapshot is created leaves it
//! inactive.

use std::collections::{HashMap, HashSet};

use tracing::{error, info};

use crate::airlines::AirlineLookup;
use crate::error::{IngestError, Result};
use crate::loader::Row;
use crate::metrics::is_well_known;
use crate::model::{NewMetric, NewRanking, NewSnapshot, RankingRef, RecordId, SnapshotRecord};
use crate::normalize::{parse_decimal, parse_integer};
use crate::services::backend::LeaderboardBackend;

/// Stored ranking ids keyed by `(airline_id, category)`.
pub type RankingIndex = HashMap<(RecordId, String), RecordId>;

/// Per-category 1-based rank counters for rows that carry no rank.
#[derive(Debug, Default)]
pub struct RankCounters {
    next: HashMap<String, i64>,
}

impl RankCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next rank for `category`, starting at 1.
    pub fn next_rank(&mut self, category: &str) -> i64 {
        let counter = self.next.entry(category.to_string()).or_insert(0);
        *counter += 1;
        *counter
    }
}

/// A validated ranking row waiting for a snapshot id.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRanking {
    pub airline_iata: String,
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
    /// `(metric_key, value)` for each metric column with a parseable value.
    pub metrics: Vec<(String, f64)>,
}

impl PreparedRanking {
    fn to_new_ranking(&self, snapshot_id: &RecordId) -> NewRanking {
        NewRanking {
            snapshot_id: snapshot_id.clone(),
            airline_id: self.airline_id.clone(),
            category: self.category.clone(),
            travel_class: self.travel_class.clone(),
            leaderboard_rank: self.leaderboard_rank,
            leaderboard_score: self.leaderboard_score,
            avg_rating: self.avg_rating,
            review_count: self.review_count,
            positive_count: self.positive_count,
            negative_count: self.negative_count,
            positive_ratio: self.positive_ratio,
            is_active: false,
        }
    }
}

/// Checks that every row names an airline and a category.
pub fn require_identity_fields(rows: &[Row]) -> Result<()> {
    for row in rows {
        for field in ["airline_iata", "category"] {
            if row.get(field).is_none() {
                return Err(IngestError::MissingField {
                    line: row.line(),
                    field,
                });
            }
        }
    }
    Ok(())
}

/// Validates and coerces `rows` into ranking records, in file order.
///
/// Rows without `leaderboard_rank` are ranked by `counters` per category.
/// A row-level `travel_class` overrides `default_travel_class`.
pub fn prepare_rankings(
    rows: &[Row],
    airlines: &AirlineLookup,
    default_travel_class: &str,
    metric_columns: &[String],
    counters: &mut RankCounters,
) -> Result<Vec<PreparedRanking>> {
    let mut seen = HashSet::new();
    let mut prepared = Vec::with_capacity(rows.len());

    for row in rows {
        let (Some(iata), Some(category)) = (row.get("airline_iata"), row.get("category")) else {
            let field = if row.get("airline_iata").is_none() {
                "airline_iata"
            } else {
                "category"
            };
            return Err(IngestError::MissingField {
                line: row.line(),
                field,
            });
        };

        let airline = airlines
            .get(iata)
            .ok_or_else(|| IngestError::UnmappedAirline(iata.to_string()))?;

        let leaderboard_score = row
            .get("leaderboard_score")
            .and_then(parse_decimal)
            .ok_or_else(|| IngestError::MissingScore {
                iata: iata.to_string(),
                category: category.to_string(),
            })?;

        if !seen.insert((airline.id.clone(), category.to_string())) {
            return Err(IngestError::DuplicateRanking {
                iata: iata.to_string(),
                category: category.to_string(),
            });
        }

        let leaderboard_rank = match row.get("leaderboard_rank").and_then(parse_integer) {
            Some(rank) => rank,
            None => counters.next_rank(category),
        };

        let metrics = metric_columns
            .iter()
            .filter(|column| !is_well_known(column))
            .filter_map(|column| {
                let value = row.get(column).and_then(parse_decimal)?;
                Some((column.clone(), value))
            })
            .collect();

        prepared.push(PreparedRanking {
            airline_iata: iata.to_uppercase(),
            airline_id: airline.id.clone(),
            category: category.to_string(),
            travel_class: row
                .get("travel_class")
                .unwrap_or(default_travel_class)
                .to_string(),
            leaderboard_rank,
            leaderboard_score,
            avg_rating: row.get("avg_rating").and_then(parse_decimal),
            review_count: row.get("review_count").and_then(parse_integer),
            positive_count: row.get("positive_count").and_then(parse_integer),
            negative_count: row.get("negative_count").and_then(parse_integer),
            positive_ratio: row.get("positive_ratio").and_then(parse_decimal),
            metrics,
        });
    }

    Ok(prepared)
}

/// Drives the backend writes for one snapshot.
pub struct SnapshotPublisher<'a, B: ?Sized> {
    backend: &'a B,
}

impl<'a, B: LeaderboardBackend + ?Sized> SnapshotPublisher<'a, B> {
    pub fn new(backend: &'a B) -> Self {
        Self { backend }
    }

    /// Creates the snapshot, inserts rankings and metrics, then activates it.
    ///
    /// # Errors
    ///
    /// Any failing step aborts the run. Failures after creation are logged
    /// with the id of the inactive snapshot left behind.
    pub async fn publish(
        &self,
        snapshot: &NewSnapshot,
        rankings: &[PreparedRanking],
    ) -> Result<SnapshotRecord> {
        let record = self.create_snapshot(snapshot).await?;

        if let Err(e) = self.populate_and_activate(&record.id, rankings).await {
            error!(
                snapshot_id = %record.id,
                error = %e,
                "Publication failed; snapshot left inactive and must be deleted or re-run"
            );
            return Err(e);
        }

        Ok(record)
    }

    async fn populate_and_activate(&self, snapshot_id: &RecordId, rankings: &[PreparedRanking]) -> Result<()> {
        self.insert_rankings(snapshot_id, rankings).await?;
        let index = self.fetch_ranking_index(snapshot_id).await?;
        self.insert_metrics(&index, rankings).await?;
        self.activate(snapshot_id).await
    }

    #[tracing::instrument(skip_all, fields(label = %snapshot.label, travel_class = %snapshot.travel_class))]
    pub async fn create_snapshot(&self, snapshot: &NewSnapshot) -> Result<SnapshotRecord> {
        let record = self.backend.create_snapshot(snapshot).await?;
        info!(snapshot_id = %record.id, "Snapshot created");
        Ok(record)
    }

    #[tracing::instrument(skip_all, fields(snapshot_id = %snapshot_id, count = rankings.len()))]
    pub async fn insert_rankings(&self, snapshot_id: &RecordId, rankings: &[PreparedRanking]) -> Result<()> {
        if rankings.is_empty() {
            return Ok(());
        }
        let batch: Vec<NewRanking> = rankings
            .iter()
            .map(|r| r.to_new_ranking(snapshot_id))
            .collect();
        self.backend.insert_rankings(&batch).await
    }

    /// Re-reads the snapshot's rankings and keys their ids by `(airline_id, category)`.
    #[tracing::instrument(skip_all, fields(snapshot_id = %snapshot_id))]
    pub async fn fetch_ranking_index(&self, snapshot_id: &RecordId) -> Result<RankingIndex> {
        let stored: Vec<RankingRef> = self.backend.list_rankings(snapshot_id).await?;
        info!(count = stored.len(), "Ranking ids fetched");
        Ok(stored
            .into_iter()
            .map(|r| ((r.airline_id, r.category), r.id))
            .collect())
    }

    #[tracing::instrument(skip_all)]
    pub async fn insert_metrics(
        &self,
        index: &RankingIndex,
        rankings: &[PreparedRanking],
    ) -> Result<()> {
        let mut batch = Vec::new();
        for ranking in rankings {
            let ranking_id = index
                .get(&(ranking.airline_id.clone(), ranking.category.clone()))
                .ok_or_else(|| IngestError::UnresolvedRanking {
                    iata: ranking.airline_iata.clone(),
                    category: ranking.category.clone(),
                })?;
            batch.extend(ranking.metrics.iter().map(|(key, value)| NewMetric {
                ranking_id: ranking_id.clone(),
                metric_key: key.clone(),
                metric_value: *value,
            }));
        }

        if batch.is_empty() {
            info!("No metric values to insert");
            return Ok(());
        }
        self.backend.insert_metrics(&batch).await
    }

    #[tracing::instrument(skip_all, fields(snapshot_id = %snapshot_id))]
    pub async fn activate(&self, snapshot_id: &RecordId) -> Result<()> {
        self.backend.activate_snapshot(snapshot_id).await?;
        info!("Snapshot activated");
        Ok(())
    }
}
