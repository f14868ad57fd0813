//! Scan orchestration
//!
//! The engine walks scan dimensions, pushing each candidate key through
//! the fetch→parse→ingest pipeline and reporting outcomes to the
//! controller and the stats collector. Open-ended dimensions are walked
//! one key at a time so the controller sees outcomes in ascending key
//! order (the miss heuristic is meaningless otherwise); closed dimensions
//! have no ordering requirement and fan out across the worker limit.
//!
//! A failed task never aborts its siblings: parse and store errors are
//! logged, counted, and the scan moves on.

use std::collections::HashSet;
use std::sync::Arc;

use capitol_common::types::{FetchOutcome, Key, MeasureType, ParsedRecord};
use futures::StreamExt;
use tracing::{debug, error, info, warn};

use crate::config::ScanConfig;
use crate::fetch::{page_url, Fetcher};
use crate::keys::Dimension;
use crate::parse;
use crate::rate::RateLimiter;
use crate::scan::{ScanController, StopReason};
use crate::sink::IngestSink;
use crate::stats::{ScanStats, StatsSummary};

/// Outcome of one key's pipeline run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// Fetched, parsed, and newly stored
    Ingested,
    /// Fetched and parsed, but the natural key was already in the store
    AlreadyStored,
    /// The resource does not exist (404)
    Missing,
    /// Fetch retries exhausted, parse error, or store error
    Failed(String),
}

/// Result of scanning one dimension
#[derive(Debug, Clone)]
pub struct DimensionReport {
    pub dimension: String,
    pub stop: StopReason,
    pub stats: StatsSummary,
}

/// The scan-and-ingest engine
///
/// One engine is built per run; the fetcher (with its session state) and
/// the sink are shared by every worker.
pub struct ScanEngine<F, S> {
    fetcher: Arc<F>,
    sink: Arc<S>,
    limiter: Arc<RateLimiter>,
    config: ScanConfig,
}

impl<F: Fetcher, S: IngestSink> ScanEngine<F, S> {
    pub fn new(fetcher: F, sink: S, config: ScanConfig) -> Self {
        let limiter = Arc::new(RateLimiter::new(config.request_delay()));
        Self {
            fetcher: Arc::new(fetcher),
            sink: Arc::new(sink),
            limiter,
            config,
        }
    }

    /// The engine's configuration
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    // ========================================================================
    // Scan operations
    // ========================================================================

    /// Open-ended scan of every requested measure type for one year
    pub async fn scan_measures_for_year(
        &self,
        year: u16,
        types: Option<&[MeasureType]>,
        start_number: u32,
    ) -> Vec<DimensionReport> {
        let types = types.unwrap_or(&MeasureType::ALL);
        info!(year, types = types.len(), "starting measure scan");

        let mut reports = Vec::with_capacity(types.len());
        for measure_type in types {
            let dimension = Dimension::OpenMeasures {
                measure_type: *measure_type,
                year,
                start: start_number,
                ceiling: self.config.measure_ceiling,
            };
            reports.push(self.run_dimension(&dimension).await);
        }
        reports
    }

    /// Closed scan over a member-ID range for one year
    pub async fn scan_members_for_year(
        &self,
        year: u16,
        start_id: u32,
        end_id: u32,
    ) -> DimensionReport {
        info!(year, start_id, end_id, "starting member scan");
        let dimension = Dimension::MemberRange {
            year,
            start: start_id,
            end: end_id.min(self.config.member_ceiling),
        };
        self.run_dimension(&dimension).await
    }

    /// Scan an explicit key list to exhaustion
    pub async fn scan_explicit(&self, keys: Vec<Key>) -> DimensionReport {
        info!(count = keys.len(), "starting explicit scan");
        self.run_dimension(&Dimension::Explicit(keys)).await
    }

    /// Scan specific measures given `(type, number, year)` tuples
    pub async fn scan_specific_measures(
        &self,
        list: &[(MeasureType, u32, u16)],
    ) -> DimensionReport {
        let keys = list
            .iter()
            .map(|(t, n, y)| Key::measure(*t, *n, *y))
            .collect();
        self.scan_explicit(keys).await
    }

    /// Scan specific members given `(member_id, year)` tuples
    pub async fn scan_specific_members(&self, list: &[(u32, u16)]) -> DimensionReport {
        let keys = list.iter().map(|(id, y)| Key::member(*id, *y)).collect();
        self.scan_explicit(keys).await
    }

    /// Measures then members for every year in the inclusive range
    pub async fn full_historical(&self, start_year: u16, end_year: u16) -> Vec<DimensionReport> {
        info!(start_year, end_year, "starting full historical scan");
        let mut reports = Vec::new();

        for year in start_year..=end_year {
            reports.extend(self.scan_measures_for_year(year, None, 1).await);
        }
        for year in start_year..=end_year {
            reports.push(self.scan_members_for_year(year, 1, self.config.member_ceiling).await);
        }

        info!("full historical scan complete");
        reports
    }

    /// Re-scan the current and previous year
    ///
    /// Idempotent by construction: already-ingested keys are skipped by
    /// the store's existence check.
    pub async fn update_recent(&self, current_year: u16) -> Vec<DimensionReport> {
        let mut reports = Vec::new();
        for year in [current_year, current_year - 1] {
            reports.extend(self.scan_measures_for_year(year, None, 1).await);
            reports.push(self.scan_members_for_year(year, 1, self.config.member_ceiling).await);
        }
        reports
    }

    // ========================================================================
    // Dimension walking
    // ========================================================================

    /// Walk one dimension to its stop condition
    pub async fn run_dimension(&self, dimension: &Dimension) -> DimensionReport {
        let stats = ScanStats::new();
        let stop = if dimension.is_open() {
            self.walk_open(dimension, &stats).await
        } else {
            self.walk_closed(dimension, &stats).await
        };

        let report = DimensionReport {
            dimension: dimension.label(),
            stop,
            stats: stats.summary(),
        };
        info!(dimension = %report.dimension, stop = %report.stop, stats = %report.stats,
              "dimension scan finished");
        report
    }

    /// Sequential walk with miss-driven termination
    ///
    /// One key in flight at a time: the controller needs outcomes in
    /// ascending key order, and the next key to probe depends on whether
    /// the scan has already stopped.
    async fn walk_open(&self, dimension: &Dimension, stats: &ScanStats) -> StopReason {
        let mut controller = ScanController::new(self.config.miss_threshold);
        let mut walked = 0u64;

        for key in dimension.keys() {
            let outcome = self.process_key(key, stats).await;
            if let Some(reason) = controller.observe(&outcome) {
                return reason;
            }

            walked += 1;
            if walked % 100 == 0 {
                info!(dimension = %dimension.label(), walked, stats = %stats.summary(),
                      "scan progress");
            }
        }

        // Ran out of keys while still scanning: the ceiling bounded us.
        controller.hit_ceiling();
        controller.stop_reason().unwrap_or(StopReason::SafetyCeiling)
    }

    /// Concurrent walk to exhaustion
    ///
    /// Every distinct key is dispatched exactly once, regardless of
    /// outcomes; duplicates in an explicit list are dropped so a key is
    /// never in flight twice.
    async fn walk_closed(&self, dimension: &Dimension, stats: &ScanStats) -> StopReason {
        let mut seen = HashSet::new();
        let keys: Vec<Key> = dimension
            .keys()
            .filter(|key| seen.insert(*key))
            .collect();

        futures::stream::iter(keys)
            .map(|key| self.process_key(key, stats))
            .buffer_unordered(self.config.concurrency)
            .collect::<Vec<_>>()
            .await;

        StopReason::Exhausted
    }

    // ========================================================================
    // Per-key pipeline
    // ========================================================================

    /// fetch → parse → ingest for one key
    ///
    /// Every failure mode is caught here; the outcome is data, never an
    /// error that could take down sibling tasks.
    pub async fn process_key(&self, key: Key, stats: &ScanStats) -> TaskOutcome {
        stats.record_attempt();
        self.limiter.acquire().await;

        let body = match self.fetcher.fetch(&key).await {
            FetchOutcome::Found(body) => body,
            FetchOutcome::Absent => {
                debug!(%key, "not found");
                stats.record_failure();
                return TaskOutcome::Missing;
            },
            FetchOutcome::PermanentFailure(reason) => {
                error!(%key, %reason, "fetch failed");
                stats.record_failure();
                return TaskOutcome::Failed(reason);
            },
        };

        let mut record = match parse::extract(&key, &body, &self.config.base_url) {
            Ok(record) => record,
            Err(err) => {
                warn!(%key, error = %err, "parse failed");
                stats.record_failure();
                return TaskOutcome::Failed(err.to_string());
            },
        };

        if let ParsedRecord::Measure(measure) = &mut record {
            measure.page_url = Some(page_url(&self.config.base_url, &key));
        }

        match self.sink.ingest(&record).await {
            Ok(capitol_common::types::InsertOutcome::Inserted) => {
                info!(%key, "ingested");
                stats.record_success();
                TaskOutcome::Ingested
            },
            Ok(capitol_common::types::InsertOutcome::AlreadyExists) => {
                debug!(%key, "already stored");
                stats.record_skip();
                TaskOutcome::AlreadyStored
            },
            Err(err) => {
                error!(%key, error = %err, "store failed");
                stats.record_failure();
                TaskOutcome::Failed(err.to_string())
            },
        }
    }
}
