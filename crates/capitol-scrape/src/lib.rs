//! Capitol Scrape Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! The scan-and-ingest engine for legislative data published at
//! deterministic, numerically-addressed endpoints with no index: existence
//! is discovered by probing `(type, number, year)` and `(member_id, year)`
//! keys, classifying each outcome, and committing parsed aggregates into
//! the store exactly once per natural key.
//!
//! # Components
//!
//! - [`rate::RateLimiter`]: global minimum spacing between requests
//! - [`fetch::FetchClient`]: one probe per key, with session bootstrap,
//!   retry, and outcome classification
//! - [`keys::Dimension`]: candidate-key enumeration for a scan
//! - [`scan::ScanController`]: miss-streak termination for open-ended
//!   dimensions
//! - [`engine::ScanEngine`]: drives dimensions through the
//!   fetch, parse, ingest pipeline and aggregates statistics
//! - [`parse`]: field extraction for measure and member pages
//!
//! # Example
//!
//! ```no_run
//! use capitol_scrape::config::ScanConfig;
//! use capitol_scrape::engine::ScanEngine;
//! use capitol_scrape::fetch::FetchClient;
//! use capitol_store::SqliteStore;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ScanConfig::default();
//!     let fetcher = FetchClient::new(&config)?;
//!     let store = SqliteStore::connect("sqlite://capitol.db").await?;
//!     let engine = ScanEngine::new(fetcher, store, config);
//!     let reports = engine.scan_measures_for_year(2025, None, 1).await;
//!     for report in reports {
//!         tracing::info!(%report.dimension, "scan finished");
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod engine;
pub mod fetch;
pub mod keys;
pub mod parse;
pub mod rate;
pub mod scan;
pub mod sink;
pub mod stats;

pub use config::ScanConfig;
pub use engine::{ScanEngine, TaskOutcome};
pub use fetch::{FetchClient, Fetcher};
pub use keys::Dimension;
pub use scan::{ScanController, StopReason};
pub use sink::IngestSink;
pub use stats::{ScanStats, StatsSummary};
