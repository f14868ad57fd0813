//! Error types for the capitol-scraper workspace

use thiserror::Error;

/// Result type alias for scraper operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Main error type for the scraper
#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Fetch failed for {key}: {reason}")]
    FetchFailed { key: String, reason: String },
}

impl ScrapeError {
    /// Shorthand for a parse error with a formatted message
    pub fn parse(msg: impl Into<String>) -> Self {
        ScrapeError::Parse(msg.into())
    }

    /// Shorthand for a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        ScrapeError::Config(msg.into())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ScrapeError::parse("missing measure header anchor");
        assert_eq!(err.to_string(), "Parse error: missing measure header anchor");

        let err = ScrapeError::FetchFailed {
            key: "SB1300-2025".to_string(),
            reason: "retries exhausted".to_string(),
        };
        assert!(err.to_string().contains("SB1300-2025"));
    }
}
