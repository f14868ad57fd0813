//! Capitol Scraper Store
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! SQLite persistence for scraped legislative data.
//!
//! The store owns the schema (natural-key UNIQUE constraints included) and
//! the idempotent aggregate-ingestion path: a parsed record and all of its
//! child collections land in a single transaction, or not at all. The
//! UNIQUE constraints are the authoritative guard against concurrent
//! duplicate inserts; the application-level existence checks are only an
//! optimization to skip parsing-adjacent work.
//!
//! # Example
//!
//! ```no_run
//! use capitol_store::SqliteStore;
//!
//! #[tokio::main]
//! async fn main() -> capitol_common::Result<()> {
//!     let store = SqliteStore::connect("sqlite://capitol.db").await?;
//!     let exists = store.member_term_exists(253, 2025).await?;
//!     println!("term ingested: {}", exists);
//!     Ok(())
//! }
//! ```

pub mod schema;
pub mod store;

pub use store::SqliteStore;
