//! In-memory [`LeaderboardBackend`] for unit tests.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{IngestError, Result};
use crate::model::{AirlineInfo, NewMetric, NewRanking, NewSnapshot, RankingRef, RecordId, SnapshotRecord};
use crate::services::backend::LeaderboardBackend;

#[derive(Default)]
struct State {
    airline_lookups: usize,
    snapshots: Vec<NewSnapshot>,
    rankings: Vec<(RecordId, NewRanking)>,
    metrics: Vec<NewMetric>,
    activated: Vec<RecordId>,
}

/// Stores writes in memory and hands out sequential ids (`s-1`, `r-1`, ...).
#[derive(Default)]
pub struct MemoryBackend {
    airlines: Vec<AirlineInfo>,
    fail_step: Option<&'static str>,
    state: Mutex<State>,
}

impl MemoryBackend {
    pub fn with_airlines(airlines: &[(&str, &str)]) -> Self {
        Self {
            airlines: airlines
                .iter()
                .map(|(id, code)| AirlineInfo {
                    id: RecordId::from(*id),
                    name: format!("{code} Airways"),
                    iata_code: code.to_string(),
                    icao_code: None,
                })
                .collect(),
            ..Default::default()
        }
    }

    /// Makes the named write operation answer with a 500.
    pub fn failing_at(mut self, step: &'static str) -> Self {
        self.fail_step = Some(step);
        self
    }

    fn check(&self, step: &'static str) -> Result<()> {
        if self.fail_step == Some(step) {
            return Err(IngestError::Backend {
                status: 500,
                body: format!("{step} failed"),
            });
        }
        Ok(())
    }

    pub fn airline_lookups(&self) -> usize {
        self.state.lock().unwrap().airline_lookups
    }

    pub fn write_count(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.snapshots.len() + state.rankings.len() + state.metrics.len() + state.activated.len()
    }

    pub fn snapshots(&self) -> Vec<NewSnapshot> {
        self.state.lock().unwrap().snapshots.clone()
    }

    pub fn rankings(&self) -> Vec<NewRanking> {
        let state = self.state.lock().unwrap();
        state.rankings.iter().map(|(_, r)| r.clone()).collect()
    }

    pub fn metrics(&self) -> Vec<NewMetric> {
        self.state.lock().unwrap().metrics.clone()
    }

    pub fn activated(&self) -> Vec<RecordId> {
        self.state.lock().unwrap().activated.clone()
    }
}

#[async_trait]
impl LeaderboardBackend for MemoryBackend {
    async fn find_airline(&self, iata_code: &str) -> Result<Option<AirlineInfo>> {
        self.state.lock().unwrap().airline_lookups += 1;
        Ok(self
            .airlines
            .iter()
            .find(|a| a.iata_code.eq_ignore_ascii_case(iata_code))
            .cloned())
    }

    async fn create_snapshot(&self, snapshot: &NewSnapshot) -> Result<SnapshotRecord> {
        self.check("create_snapshot")?;
        let mut state = self.state.lock().unwrap();
        state.snapshots.push(snapshot.clone());
        Ok(SnapshotRecord {
            id: RecordId::Text(format!("s-{}", state.snapshots.len())),
            label: snapshot.label.clone(),
            travel_class: snapshot.travel_class.clone(),
        })
    }

    async fn insert_rankings(&self, rankings: &[NewRanking]) -> Result<()> {
        self.check("insert_rankings")?;
        let mut state = self.state.lock().unwrap();
        for ranking in rankings {
            let id = RecordId::Text(format!("r-{}", state.rankings.len() + 1));
            state.rankings.push((id, ranking.clone()));
        }
        Ok(())
    }

    async fn list_rankings(&self, snapshot_id: &RecordId) -> Result<Vec<RankingRef>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .rankings
            .iter()
            .filter(|(_, r)| &r.snapshot_id == snapshot_id)
            .map(|(id, r)| RankingRef {
                id: id.clone(),
                airline_id: r.airline_id.clone(),
                category: r.category.clone(),
                travel_class: Some(r.travel_class.clone()),
            })
            .collect())
    }

    async fn insert_metrics(&self, metrics: &[NewMetric]) -> Result<()> {
        self.check("insert_metrics")?;
        self.state.lock().unwrap().metrics.extend_from_slice(metrics);
        Ok(())
    }

    async fn activate_snapshot(&self, snapshot_id: &RecordId) -> Result<()> {
        self.check("activate_snapshot")?;
        self.state.lock().unwrap().activated.push(snapshot_id.clone());
        Ok(())
    }
}
