//! Engine scan behavior against scripted fetchers
//!
//! These tests drive the full fetch→parse→ingest pipeline with a scripted
//! network boundary and either an in-memory fake sink or a real SQLite
//! store, covering termination, exhaustiveness, idempotence, and failure
//! isolation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use capitol_common::types::{FetchOutcome, InsertOutcome, Key, MeasureType, ParsedRecord};
use capitol_common::Result;
use capitol_scrape::config::ScanConfig;
use capitol_scrape::engine::ScanEngine;
use capitol_scrape::fetch::Fetcher;
use capitol_scrape::keys::Dimension;
use capitol_scrape::scan::StopReason;
use capitol_scrape::sink::IngestSink;
use capitol_store::SqliteStore;

/// Minimal parseable measure page
fn measure_page(label: &str) -> String {
    format!(r#"<a id="MainContent_LinkButtonMeasure">{}</a>"#, label)
}

/// Minimal parseable member page
fn member_page(name: &str) -> String {
    format!(r#"<span id="LabelLegname">{} (D)</span>"#, name)
}

/// Scripted network boundary that records every probe
struct ScriptedFetcher {
    script: Box<dyn Fn(&Key) -> FetchOutcome + Send + Sync>,
    calls: Arc<Mutex<Vec<Key>>>,
}

impl ScriptedFetcher {
    fn new(script: impl Fn(&Key) -> FetchOutcome + Send + Sync + 'static) -> (Self, Arc<Mutex<Vec<Key>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                script: Box::new(script),
                calls: Arc::clone(&calls),
            },
            calls,
        )
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, key: &Key) -> FetchOutcome {
        self.calls.lock().unwrap().push(*key);
        (self.script)(key)
    }
}

/// In-memory sink keyed by natural key
#[derive(Default)]
struct MemorySink {
    records: Mutex<HashMap<String, ParsedRecord>>,
}

#[async_trait]
impl IngestSink for MemorySink {
    async fn ingest(&self, record: &ParsedRecord) -> Result<InsertOutcome> {
        let mut records = self.records.lock().unwrap();
        let natural_key = record.key().to_string();
        if records.contains_key(&natural_key) {
            Ok(InsertOutcome::AlreadyExists)
        } else {
            records.insert(natural_key, record.clone());
            Ok(InsertOutcome::Inserted)
        }
    }
}

fn test_config() -> ScanConfig {
    ScanConfig {
        base_url: "https://example.test".to_string(),
        request_delay_ms: 0,
        concurrency: 4,
        ..Default::default()
    }
}

#[tokio::test]
async fn closed_list_issues_exactly_k_attempts_regardless_of_outcomes() {
    let (fetcher, calls) = ScriptedFetcher::new(|_| FetchOutcome::Absent);
    let engine = ScanEngine::new(fetcher, MemorySink::default(), test_config());

    let keys: Vec<Key> = (1..=7).map(|n| Key::measure(MeasureType::HB, n, 2025)).collect();
    let report = engine.scan_explicit(keys).await;

    assert_eq!(report.stop, StopReason::Exhausted);
    assert_eq!(report.stats.attempted, 7);
    assert_eq!(calls.lock().unwrap().len(), 7);
}

#[tokio::test]
async fn duplicate_keys_in_explicit_list_are_dispatched_once() {
    let (fetcher, calls) = ScriptedFetcher::new(|_| FetchOutcome::Absent);
    let engine = ScanEngine::new(fetcher, MemorySink::default(), test_config());

    let key = Key::measure(MeasureType::SB, 1, 2025);
    let report = engine.scan_explicit(vec![key, key, key]).await;

    assert_eq!(report.stats.attempted, 1);
    assert_eq!(calls.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn open_scan_stops_after_miss_threshold_and_never_probes_further() {
    // Sequences 1-3 exist, 4 and 5 do not (threshold 2): exactly 5
    // attempts, 3 inserted, stop reason MissLimit, sequence 6 untouched.
    let (fetcher, calls) = ScriptedFetcher::new(|key| {
        if key.sequence() <= 3 {
            FetchOutcome::Found(measure_page("SB"))
        } else {
            FetchOutcome::Absent
        }
    });
    let engine = ScanEngine::new(fetcher, MemorySink::default(), test_config());

    let reports = engine
        .scan_measures_for_year(2025, Some(&[MeasureType::SB]), 1)
        .await;

    assert_eq!(reports.len(), 1);
    let report = &reports[0];
    assert_eq!(report.stop, StopReason::MissLimit);
    assert_eq!(report.stats.attempted, 5);
    assert_eq!(report.stats.succeeded, 3);
    assert_eq!(report.stats.failed, 2);

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 5);
    assert!(calls.iter().all(|key| key.sequence() <= 5));
}

#[tokio::test]
async fn open_scan_outcomes_observed_in_ascending_key_order() {
    let (fetcher, calls) = ScriptedFetcher::new(|_| FetchOutcome::Absent);
    let engine = ScanEngine::new(fetcher, MemorySink::default(), test_config());

    engine
        .scan_measures_for_year(2025, Some(&[MeasureType::GM]), 1)
        .await;

    let sequences: Vec<u32> = calls.lock().unwrap().iter().map(Key::sequence).collect();
    let mut sorted = sequences.clone();
    sorted.sort_unstable();
    assert_eq!(sequences, sorted);
}

#[tokio::test]
async fn safety_ceiling_bounds_open_scan() {
    // Everything exists, so the miss heuristic never fires; the ceiling
    // must force termination.
    let (fetcher, calls) =
        ScriptedFetcher::new(|_| FetchOutcome::Found(measure_page("SB")));
    let mut config = test_config();
    config.measure_ceiling = 25;
    let engine = ScanEngine::new(fetcher, MemorySink::default(), config);

    let reports = engine
        .scan_measures_for_year(2025, Some(&[MeasureType::SB]), 1)
        .await;

    assert_eq!(reports[0].stop, StopReason::SafetyCeiling);
    assert_eq!(calls.lock().unwrap().len(), 25);
}

#[tokio::test]
async fn transient_outage_does_not_terminate_open_scan() {
    // One miss, a three-key outage, then another miss: failures never
    // advance the miss counter, so the scan survives the outage and stops
    // on the genuine Absent streak.
    let (fetcher, _calls) = ScriptedFetcher::new(|key| match key.sequence() {
        1 => FetchOutcome::Absent,
        2..=4 => FetchOutcome::PermanentFailure("connect timeout".to_string()),
        _ => FetchOutcome::Absent,
    });
    let engine = ScanEngine::new(fetcher, MemorySink::default(), test_config());

    let reports = engine
        .scan_measures_for_year(2025, Some(&[MeasureType::SB]), 1)
        .await;

    let report = &reports[0];
    assert_eq!(report.stop, StopReason::MissLimit);
    assert_eq!(report.stats.attempted, 5);
}

#[tokio::test]
async fn failure_only_outage_runs_to_ceiling_not_miss_limit() {
    let (fetcher, _calls) =
        ScriptedFetcher::new(|_| FetchOutcome::PermanentFailure("unreachable".to_string()));
    let mut config = test_config();
    config.measure_ceiling = 10;
    let engine = ScanEngine::new(fetcher, MemorySink::default(), config);

    let reports = engine
        .scan_measures_for_year(2025, Some(&[MeasureType::SB]), 1)
        .await;

    assert_eq!(reports[0].stop, StopReason::SafetyCeiling);
    assert_eq!(reports[0].stats.attempted, 10);
}

#[tokio::test]
async fn parse_failure_does_not_abort_siblings() {
    // Key 2 returns an unparseable shell page; keys 1 and 3 still land.
    let (fetcher, _calls) = ScriptedFetcher::new(|key| {
        if key.sequence() == 2 {
            FetchOutcome::Found("<html><body>shell</body></html>".to_string())
        } else {
            FetchOutcome::Found(member_page("Member"))
        }
    });
    let engine = ScanEngine::new(fetcher, MemorySink::default(), test_config());

    let report = engine.scan_members_for_year(2025, 1, 3).await;

    assert_eq!(report.stop, StopReason::Exhausted);
    assert_eq!(report.stats.attempted, 3);
    assert_eq!(report.stats.succeeded, 2);
    assert_eq!(report.stats.failed, 1);
}

#[tokio::test]
async fn rerunning_identical_scan_does_not_duplicate_store_content() {
    let config = test_config();
    let store = SqliteStore::in_memory().await.unwrap();

    let script = |key: &Key| {
        if key.sequence() <= 3 {
            FetchOutcome::Found(measure_page("SB"))
        } else {
            FetchOutcome::Absent
        }
    };

    let (fetcher, _) = ScriptedFetcher::new(script);
    let engine = ScanEngine::new(fetcher, store.clone(), config.clone());
    let first = engine
        .scan_measures_for_year(2025, Some(&[MeasureType::SB]), 1)
        .await;
    assert_eq!(first[0].stats.succeeded, 3);
    assert_eq!(store.measure_count().await.unwrap(), 3);

    // Identical second run: same attempts, zero new rows, all skips.
    let (fetcher, _) = ScriptedFetcher::new(script);
    let engine = ScanEngine::new(fetcher, store.clone(), config);
    let second = engine
        .scan_measures_for_year(2025, Some(&[MeasureType::SB]), 1)
        .await;

    assert_eq!(second[0].stats.attempted, 5);
    assert_eq!(second[0].stats.skipped, 3);
    assert_eq!(second[0].stats.succeeded, 0);
    assert_eq!(store.measure_count().await.unwrap(), 3);
}

#[tokio::test]
async fn member_range_scan_is_exhaustive_under_concurrency() {
    for concurrency in [1, 4, 8] {
        let (fetcher, calls) = ScriptedFetcher::new(|key| {
            if key.sequence() % 2 == 0 {
                FetchOutcome::Found(member_page("Even"))
            } else {
                FetchOutcome::Absent
            }
        });
        let mut config = test_config();
        config.concurrency = concurrency;
        let engine = ScanEngine::new(fetcher, MemorySink::default(), config);

        let report = engine.scan_members_for_year(2025, 1, 20).await;

        assert_eq!(report.stop, StopReason::Exhausted);
        assert_eq!(report.stats.attempted, 20);
        assert_eq!(report.stats.succeeded, 10);
        assert_eq!(calls.lock().unwrap().len(), 20);
    }
}

#[tokio::test]
async fn explicit_dimension_keys_drive_run_dimension() {
    let (fetcher, _calls) = ScriptedFetcher::new(|_| FetchOutcome::Absent);
    let engine = ScanEngine::new(fetcher, MemorySink::default(), test_config());

    let dimension = Dimension::Explicit(vec![
        Key::measure(MeasureType::SB, 1300, 2025),
        Key::member(253, 2025),
    ]);
    let report = engine.run_dimension(&dimension).await;

    assert_eq!(report.stop, StopReason::Exhausted);
    assert_eq!(report.stats.attempted, 2);
}
