//! Trait describing the leaderboard backend operations an ingestion run needs.

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{AirlineInfo, NewMetric, NewRanking, NewSnapshot, RankingRef, RecordId, SnapshotRecord};

/// Abstraction over the hosted leaderboard store.
///
/// Read operations: [`find_airline`](Self::find_airline) and
/// [`list_rankings`](Self::list_rankings). Everything else writes.
#[async_trait]
pub trait LeaderboardBackend: Send + Sync {
    /// Looks up an airline by IATA code, ignoring case.
    async fn find_airline(&self, iata_code: &str) -> Result<Option<AirlineInfo>>;

    /// Creates an inactive snapshot and returns it with its generated id.
    async fn create_snapshot(&self, snapshot: &NewSnapshot) -> Result<SnapshotRecord>;

    /// Inserts all ranking rows in one call.
    async fn insert_rankings(&self, rankings: &[NewRanking]) -> Result<()>;

    /// Returns every ranking row stored for `snapshot_id`.
    async fn list_rankings(&self, snapshot_id: &RecordId) -> Result<Vec<RankingRef>>;

    /// Inserts all metric rows in one call.
    async fn insert_metrics(&self, metrics: &[NewMetric]) -> Result<()>;

    /// Makes `snapshot_id` the active snapshot for its travel class.
    async fn activate_snapshot(&self, snapshot_id: &RecordId) -> Result<()>;
}
