//! Boundary to persistence
//!
//! The engine only ever sees this trait; the SQLite implementation lives
//! in `capitol-store`, and tests substitute an in-memory fake.

use async_trait::async_trait;
use capitol_common::types::{InsertOutcome, ParsedRecord};
use capitol_common::Result;
use capitol_store::SqliteStore;

/// Where parsed aggregates go
#[async_trait]
pub trait IngestSink: Send + Sync {
    /// Idempotently insert one aggregate
    async fn ingest(&self, record: &ParsedRecord) -> Result<InsertOutcome>;
}

#[async_trait]
impl IngestSink for SqliteStore {
    async fn ingest(&self, record: &ParsedRecord) -> Result<InsertOutcome> {
        match record {
            ParsedRecord::Measure(measure) => self.ingest_measure(measure).await,
            ParsedRecord::Member(member) => self.ingest_member(member).await,
        }
    }
}
