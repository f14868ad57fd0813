//! Global request spacing
//!
//! One limiter instance is shared by every worker; the mutex serializes
//! grants, so the total outbound rate never exceeds `1/interval` no matter
//! the concurrency level. Release order is FIFO-ish via the mutex queue.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Enforces a minimum interval between grants across all callers
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    next_free: Mutex<Instant>,
}

impl RateLimiter {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_free: Mutex::new(Instant::now()),
        }
    }

    /// Suspend until at least `interval` has elapsed since the previous
    /// grant
    pub async fn acquire(&self) {
        let mut next_free = self.next_free.lock().await;
        let now = Instant::now();
        if *next_free > now {
            let wait = *next_free - now;
            *next_free += self.interval;
            drop(next_free);
            tokio::time::sleep(wait).await;
        } else {
            *next_free = now + self.interval;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_spacing_between_grants() {
        let limiter = RateLimiter::new(Duration::from_millis(100));

        let start = Instant::now();
        limiter.acquire().await;
        limiter.acquire().await;
        limiter.acquire().await;

        // Three grants need at least two full intervals.
        assert!(start.elapsed() >= Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_holds_across_concurrent_callers() {
        let limiter = Arc::new(RateLimiter::new(Duration::from_millis(50)));
        let start = Instant::now();

        let mut handles = Vec::new();
        for _ in 0..4 {
            let limiter = Arc::clone(&limiter);
            handles.push(tokio::spawn(async move {
                limiter.acquire().await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        // Four grants from four tasks still span three intervals.
        assert!(start.elapsed() >= Duration::from_millis(150));
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_limiter_grants_immediately() {
        let limiter = RateLimiter::new(Duration::from_millis(100));
        tokio::time::sleep(Duration::from_millis(500)).await;

        let start = Instant::now();
        limiter.acquire().await;
        assert!(start.elapsed() < Duration::from_millis(1));
    }
}
