use std::sync::Mutex;

use async_trait::async_trait;
use leaderboard_ingest::error::Result;
use leaderboard_ingest::ingest::{IngestOptions, IngestOutcome, run};
use leaderboard_ingest::model::{
    AirlineInfo, NewMetric, NewRanking, NewSnapshot, RankingRef, RecordId, SnapshotRecord,
};
use leaderboard_ingest::services::backend::LeaderboardBackend;

const AIRLINES: [&str; 3] = ["BA", "LH", "AF"];
const SNAPSHOT_ID: i64 = 1001;

const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/leaderboard.csv");

#[derive(Default)]
struct Recorder {
    calls: Mutex<Vec<String>>,
    rankings: Mutex<Vec<NewRanking>>,
    metrics: Mutex<Vec<NewMetric>>,
}

impl Recorder {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn log(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

#[async_trait]
impl LeaderboardBackend for Recorder {
    async fn find_airline(&self, iata_code: &str) -> Result<Option<AirlineInfo>> {
        self.log(format!("find_airline {iata_code}"));
        // Keyed like a bigint-backed table.
        Ok(AIRLINES
            .iter()
            .position(|code| *code == iata_code)
            .map(|i| AirlineInfo {
                id: RecordId::Number(i as i64 + 1),
                name: iata_code.to_string(),
                iata_code: iata_code.to_string(),
                icao_code: None,
            }))
    }

    async fn create_snapshot(&self, snapshot: &NewSnapshot) -> Result<SnapshotRecord> {
        self.log("create_snapshot");
        Ok(SnapshotRecord {
            id: RecordId::Number(SNAPSHOT_ID),
            label: snapshot.label.clone(),
            travel_class: snapshot.travel_class.clone(),
        })
    }

    async fn insert_rankings(&self, rankings: &[NewRanking]) -> Result<()> {
        self.log("insert_rankings");
        self.rankings.lock().unwrap().extend_from_slice(rankings);
        Ok(())
    }

    async fn list_rankings(&self, snapshot_id: &RecordId) -> Result<Vec<RankingRef>> {
        self.log("list_rankings");
        // Return them reversed: linkage must not depend on insertion order.
        Ok(self
            .rankings
            .lock()
            .unwrap()
            .iter()
            .enumerate()
            .filter(|(_, r)| &r.snapshot_id == snapshot_id)
            .map(|(i, r)| RankingRef {
                id: RecordId::Number(500 + i as i64),
                airline_id: r.airline_id.clone(),
                category: r.category.clone(),
                travel_class: Some(r.travel_class.clone()),
            })
            .rev()
            .collect())
    }

    async fn insert_metrics(&self, metrics: &[NewMetric]) -> Result<()> {
        self.log("insert_metrics");
        self.metrics.lock().unwrap().extend_from_slice(metrics);
        Ok(())
    }

    async fn activate_snapshot(&self, snapshot_id: &RecordId) -> Result<()> {
        self.log(format!("activate_snapshot {snapshot_id}"));
        Ok(())
    }
}

fn options(dry_run: bool) -> IngestOptions {
    IngestOptions {
        csv_path: FIXTURE.into(),
        label: Some("Nov 2025 Upload".to_string()),
        travel_class: Some("Business".to_string()),
        dry_run,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_full_pipeline() {
    let backend = Recorder::default();
    let mut out = Vec::new();

    let outcome = run(&options(false), &backend, &mut out)
        .await
        .expect("ingestion failed");

    assert_eq!(
        outcome,
        IngestOutcome::Published {
            snapshot_id: RecordId::Number(SNAPSHOT_ID),
            label: "Nov 2025 Upload".to_string(),
            travel_class: "Business".to_string(),
            rankings: 4,
        }
    );
    assert_eq!(
        backend.calls(),
        vec![
            "find_airline AF",
            "find_airline BA",
            "find_airline LH",
            "create_snapshot",
            "insert_rankings",
            "list_rankings",
            "insert_metrics",
            "activate_snapshot 1001",
        ]
    );

    let rankings = backend.rankings.lock().unwrap().clone();
    let ranks: Vec<i64> = rankings.iter().map(|r| r.leaderboard_rank).collect();
    assert_eq!(ranks, vec![1, 2, 1, 3]);
    assert_eq!(rankings[0].review_count, Some(1204));
    assert_eq!(rankings[0].positive_ratio, Some(92.0));
    assert_eq!(rankings[1].airline_id, RecordId::Number(2));
    assert!(rankings.iter().all(|r| r.snapshot_id == RecordId::Number(SNAPSHOT_ID)));

    let metrics = backend.metrics.lock().unwrap().clone();
    let linked: Vec<(RecordId, &str, f64)> = metrics
        .iter()
        .map(|m| (m.ranking_id.clone(), m.metric_key.as_str(), m.metric_value))
        .collect();
    assert_eq!(
        linked,
        vec![
            (RecordId::Number(500), "seat_pitch", 31.0),
            (RecordId::Number(500), "wifi_speed", 24.5),
            (RecordId::Number(501), "seat_pitch", 30.0),
            (RecordId::Number(502), "seat_pitch", 32.0),
        ]
    );

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Snapshot 'Nov 2025 Upload' (1001) activated for travel class Business."));
}

#[tokio::test]
async fn test_dry_run_only_reads() {
    let backend = Recorder::default();
    let mut out = Vec::new();

    let outcome = run(&options(true), &backend, &mut out).await.unwrap();

    assert_eq!(
        outcome,
        IngestOutcome::DryRun {
            rows: 4,
            metric_columns: vec!["seat_pitch".to_string(), "wifi_speed".to_string()],
        }
    );
    assert!(backend.calls().iter().all(|c| c.starts_with("find_airline")));
    let text = String::from_utf8(out).unwrap();
    assert_eq!(text.lines().filter(|l| l.starts_with("  - ")).count(), 4);
    assert!(text.contains("lh / Wi-Fi -> score 88"));
}
