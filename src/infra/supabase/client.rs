use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, warn};

use super::rest::RestClient;
use crate::config::BackendConfig;
use crate::error::{IngestError, Result};
use crate::fetch::auth::ApiKey;
use crate::fetch::{BasicClient, HttpClient};
use crate::model::{AirlineInfo, NewMetric, NewRanking, NewSnapshot, RankingRef, RecordId, SnapshotRecord};
use crate::services::backend::LeaderboardBackend;

const AIRLINES_PATH: &str = "/rest/v1/airlines";
const SNAPSHOTS_PATH: &str = "/rest/v1/leaderboard_snapshots";
const RANKINGS_PATH: &str = "/rest/v1/leaderboard_rankings";
const METRICS_PATH: &str = "/rest/v1/leaderboard_metrics";
const ACTIVATE_PATH: &str = "/rest/v1/rpc/activate_leaderboard_snapshot";

const RETURN_REPRESENTATION: &str = "return=representation";
const RETURN_MINIMAL: &str = "return=minimal";

/// PostgREST may answer an insert with the object itself or a one-element array.
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

/// [`LeaderboardBackend`] over the Supabase REST (PostgREST) API.
pub struct SupabaseBackend<C> {
    rest: RestClient<C>,
}

impl SupabaseBackend<ApiKey<ApiKey<BasicClient>>> {
    /// Builds the production transport: `apikey` plus bearer auth over reqwest.
    pub fn connect(config: &BackendConfig) -> Result<Self> {
        let key = config.service_role_key();
        let http = ApiKey::new(ApiKey::bearer(BasicClient::new(), key)?, "apikey", key)?;
        Ok(Self::new(RestClient::new(config.url(), http)?))
    }
}

impl<C: HttpClient> SupabaseBackend<C> {
    pub fn new(rest: RestClient<C>) -> Self {
        Self { rest }
    }
}

#[async_trait]
impl<C: HttpClient> LeaderboardBackend for SupabaseBackend<C> {
    async fn find_airline(&self, iata_code: &str) -> Result<Option<AirlineInfo>> {
        // `%`, `_` and `*` are wildcards inside an `ilike` pattern.
        if iata_code.is_empty() || !iata_code.chars().all(|c| c.is_ascii_alphanumeric()) {
            warn!(iata_code, "Airline code is not alphanumeric; no lookup sent");
            return Ok(None);
        }
        let filter = format!("ilike.{iata_code}");
        let mut matches: Vec<AirlineInfo> = self
            .rest
            .get_json(
                AIRLINES_PATH,
                &[
                    ("select", "id,name,iata_code,icao_code"),
                    ("iata_code", filter.as_str()),
                ],
            )
            .await?;
        debug!(iata_code, matches = matches.len(), "Airline lookup");
        if matches.is_empty() {
            Ok(None)
        } else {
            Ok(Some(matches.swap_remove(0)))
        }
    }

    async fn create_snapshot(&self, snapshot: &NewSnapshot) -> Result<SnapshotRecord> {
        let created: OneOrMany<SnapshotRecord> = self
            .rest
            .post_json(
                SNAPSHOTS_PATH,
                &[("select", "id,label,travel_class")],
                Some(RETURN_REPRESENTATION),
                snapshot,
            )
            .await?;
        match created {
            OneOrMany::One(record) => Ok(record),
            OneOrMany::Many(records) => records
                .into_iter()
                .next()
                .ok_or(IngestError::EmptyResponse("snapshot insert")),
        }
    }

    async fn insert_rankings(&self, rankings: &[NewRanking]) -> Result<()> {
        self.rest
            .post(
                RANKINGS_PATH,
                &[("select", "id,airline_id,category")],
                Some(RETURN_REPRESENTATION),
                rankings,
            )
            .await?;
        info!(count = rankings.len(), "Ranking rows inserted");
        Ok(())
    }

    async fn list_rankings(&self, snapshot_id: &RecordId) -> Result<Vec<RankingRef>> {
        let filter = format!("eq.{snapshot_id}");
        self.rest
            .get_json(
                RANKINGS_PATH,
                &[
                    ("snapshot_id", filter.as_str()),
                    ("select", "id,airline_id,category,travel_class"),
                ],
            )
            .await
    }

    async fn insert_metrics(&self, metrics: &[NewMetric]) -> Result<()> {
        self.rest
            .post(METRICS_PATH, &[], Some(RETURN_MINIMAL), metrics)
            .await?;
        info!(count = metrics.len(), "Metric rows inserted");
        Ok(())
    }

    async fn activate_snapshot(&self, snapshot_id: &RecordId) -> Result<()> {
        self.rest
            .post(ACTIVATE_PATH, &[], None, &json!({ "p_snapshot_id": snapshot_id }))
            .await?;
        Ok(())
    }
}
