//! Scan configuration
//!
//! Every bound the engine honors is injected here; nothing in the scan
//! loops is a hard-coded literal. Defaults mirror the site's politeness
//! expectations: one request every 500ms, two consecutive misses to end an
//! open scan, and hard ceilings bounding worst-case runtime.

use capitol_common::error::{Result, ScrapeError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default site root
pub const DEFAULT_BASE_URL: &str = "https://www.capitol.hawaii.gov";

/// Default SQLite database location
pub const DEFAULT_DATABASE_URL: &str = "sqlite://capitol.db";

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Site root, also used for URL normalization
    pub base_url: String,

    /// Minimum spacing between outbound requests, in milliseconds
    pub request_delay_ms: u64,

    /// Per-request timeout, in seconds
    pub request_timeout_secs: u64,

    /// Maximum fetch attempts per key
    pub max_retries: u32,

    /// Concurrent workers for closed-dimension scans (1-8)
    pub concurrency: usize,

    /// Consecutive `Absent` outcomes that end an open-ended scan
    pub miss_threshold: u32,

    /// Hard ceiling on measure numbers per open-ended scan
    pub measure_ceiling: u32,

    /// Hard ceiling on member IDs
    pub member_ceiling: u32,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_delay_ms: 500,
            request_timeout_secs: 30,
            max_retries: 3,
            concurrency: 4,
            miss_threshold: 2,
            measure_ceiling: 10_000,
            member_ceiling: 1_500,
        }
    }
}

impl ScanConfig {
    /// Load defaults, then apply environment overrides
    ///
    /// - `CAPITOL_BASE_URL`
    /// - `CAPITOL_REQUEST_DELAY_MS`
    /// - `CAPITOL_REQUEST_TIMEOUT_SECS`
    /// - `CAPITOL_MAX_RETRIES`
    /// - `CAPITOL_CONCURRENCY`
    /// - `CAPITOL_MISS_THRESHOLD`
    /// - `CAPITOL_MEASURE_CEILING`
    /// - `CAPITOL_MEMBER_CEILING`
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("CAPITOL_BASE_URL") {
            config.base_url = url;
        }
        env_override("CAPITOL_REQUEST_DELAY_MS", &mut config.request_delay_ms)?;
        env_override("CAPITOL_REQUEST_TIMEOUT_SECS", &mut config.request_timeout_secs)?;
        env_override("CAPITOL_MAX_RETRIES", &mut config.max_retries)?;
        env_override("CAPITOL_CONCURRENCY", &mut config.concurrency)?;
        env_override("CAPITOL_MISS_THRESHOLD", &mut config.miss_threshold)?;
        env_override("CAPITOL_MEASURE_CEILING", &mut config.measure_ceiling)?;
        env_override("CAPITOL_MEMBER_CEILING", &mut config.member_ceiling)?;

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the engine cannot honor
    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 || self.concurrency > 8 {
            return Err(ScrapeError::config(format!(
                "concurrency must be between 1 and 8, got {}",
                self.concurrency
            )));
        }
        if self.max_retries == 0 {
            return Err(ScrapeError::config("max_retries must be at least 1"));
        }
        if self.miss_threshold == 0 {
            return Err(ScrapeError::config("miss_threshold must be at least 1"));
        }
        if self.base_url.is_empty() {
            return Err(ScrapeError::config("base_url must not be empty"));
        }
        Ok(())
    }

    /// Minimum request spacing as a [`Duration`]
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    /// Per-request timeout as a [`Duration`]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Overwrite `target` with the parsed value of `name` when it is set
fn env_override<T: std::str::FromStr>(name: &str, target: &mut T) -> Result<()> {
    if let Ok(value) = std::env::var(name) {
        *target = value
            .parse()
            .map_err(|_| ScrapeError::config(format!("{} must be an integer", name)))?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ScanConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.miss_threshold, 2);
        assert_eq!(config.measure_ceiling, 10_000);
        assert_eq!(config.member_ceiling, 1_500);
        assert_eq!(config.request_delay(), Duration::from_millis(500));
    }

    #[test]
    fn test_env_overrides_cover_every_knob() {
        let vars = [
            ("CAPITOL_BASE_URL", "https://example.test"),
            ("CAPITOL_REQUEST_DELAY_MS", "250"),
            ("CAPITOL_REQUEST_TIMEOUT_SECS", "10"),
            ("CAPITOL_MAX_RETRIES", "5"),
            ("CAPITOL_CONCURRENCY", "2"),
            ("CAPITOL_MISS_THRESHOLD", "3"),
            ("CAPITOL_MEASURE_CEILING", "500"),
            ("CAPITOL_MEMBER_CEILING", "100"),
        ];
        for (name, value) in vars {
            std::env::set_var(name, value);
        }
        let config = ScanConfig::from_env();
        for (name, _) in vars {
            std::env::remove_var(name);
        }

        let config = config.unwrap();
        assert_eq!(config.base_url, "https://example.test");
        assert_eq!(config.request_delay_ms, 250);
        assert_eq!(config.request_timeout_secs, 10);
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.concurrency, 2);
        assert_eq!(config.miss_threshold, 3);
        assert_eq!(config.measure_ceiling, 500);
        assert_eq!(config.member_ceiling, 100);
    }

    #[test]
    fn test_rejects_zero_concurrency() {
        let config = ScanConfig {
            concurrency: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_excess_concurrency() {
        let config = ScanConfig {
            concurrency: 9,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_miss_threshold() {
        let config = ScanConfig {
            miss_threshold: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
