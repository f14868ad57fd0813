//! Single-key fetch with retry and outcome classification
//!
//! One [`FetchClient`] is constructed per run and shared by every worker;
//! it owns the cookie jar, so the one-time session bootstrap (a GET of the
//! site root to pick up cookies) benefits all subsequent requests. The
//! bootstrap is advisory: its failure is logged and swallowed.

use std::time::Duration;

use async_trait::async_trait;
use capitol_common::types::{FetchOutcome, Key};
use capitol_common::Result;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::config::ScanConfig;

/// The page URL for a key under the given site root
pub fn page_url(base_url: &str, key: &Key) -> String {
    let base = base_url.trim_end_matches('/');
    match key {
        Key::Measure {
            measure_type,
            number,
            year,
        } => format!(
            "{}/session/measure_indiv.aspx?billtype={}&billnumber={}&year={}",
            base, measure_type, number, year
        ),
        Key::Member { member_id, year } => format!(
            "{}/legislature/memberpage.aspx?member={}&year={}",
            base, member_id, year
        ),
    }
}

/// Boundary to the network probe capability
///
/// The engine and its tests depend on this seam, not on `reqwest`.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Probe one key and classify the outcome
    async fn fetch(&self, key: &Key) -> FetchOutcome;
}

/// HTTP fetcher with session state, retry, and backoff
#[derive(Debug)]
pub struct FetchClient {
    client: reqwest::Client,
    base_url: String,
    max_retries: u32,
    bootstrapped: OnceCell<()>,
}

impl FetchClient {
    /// Build a client with a cookie store and the configured timeout
    pub fn new(config: &ScanConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_retries: config.max_retries,
            bootstrapped: OnceCell::new(),
        })
    }

    /// The page URL for a key
    pub fn url_for(&self, key: &Key) -> String {
        page_url(&self.base_url, key)
    }

    /// Visit the site root once to acquire session cookies
    ///
    /// Best-effort: a failed bootstrap never blocks real fetches.
    async fn bootstrap_session(&self) {
        self.bootstrapped
            .get_or_init(|| async {
                match self.client.get(&self.base_url).send().await {
                    Ok(response) => {
                        debug!(status = %response.status(), "session bootstrap complete")
                    },
                    Err(err) => debug!(error = %err, "session bootstrap failed; continuing"),
                }
            })
            .await;
    }
}

#[async_trait]
impl Fetcher for FetchClient {
    async fn fetch(&self, key: &Key) -> FetchOutcome {
        self.bootstrap_session().await;

        let url = self.url_for(key);
        let mut last_error = String::new();

        for attempt in 0..self.max_retries {
            match self.client.get(&url).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        match response.text().await {
                            Ok(body) => return FetchOutcome::Found(body),
                            Err(err) => {
                                last_error = format!("body read failed: {}", err);
                                warn!(%key, error = %err, "failed to read response body");
                            },
                        }
                    } else if status == reqwest::StatusCode::NOT_FOUND {
                        // An absence is definitive, not transient.
                        return FetchOutcome::Absent;
                    } else {
                        last_error = format!("HTTP {}", status);
                        warn!(%key, %status, attempt, "unexpected status");
                    }
                },
                Err(err) => {
                    last_error = err.to_string();
                    warn!(%key, error = %err, attempt, "request error");
                },
            }

            if attempt + 1 < self.max_retries {
                tokio::time::sleep(Duration::from_secs(1 << attempt)).await;
            }
        }

        FetchOutcome::PermanentFailure(last_error)
    }
}
