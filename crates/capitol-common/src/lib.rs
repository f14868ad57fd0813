//! Capitol Scraper Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, error handling, and logging for the capitol-scraper
//! workspace.
//!
//! # Overview
//!
//! This crate provides the pieces used by every workspace member:
//!
//! - **Error Handling**: the [`ScrapeError`] type and [`Result`] alias
//! - **Logging**: `tracing`-based logging configuration and init
//! - **Types**: keys, fetch outcomes, and parsed record aggregates

pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{Result, ScrapeError};
