//! Rate limiting for sweeps.
//!
//! Token bucket pacing so a sweep does not flood the local segment.

use governor::{Quota, RateLimiter as GovLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;

type DirectLimiter = GovLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// A shared probes-per-second limiter.
///
/// Clones share the same bucket.
#[derive(Clone)]
pub struct RateLimiter {
    limiter: Arc<DirectLimiter>,
}

impl RateLimiter {
    /// Allow at most `rate` probes per second.
    pub fn new(rate: NonZeroU32) -> Self {
        Self {
            limiter: Arc::new(GovLimiter::direct(Quota::per_second(rate))),
        }
    }

    /// Build a limiter from a raw rate where 0 means unlimited.
    pub fn from_rate(rate: u32) -> Option<Self> {
        NonZeroU32::new(rate).map(Self::new)
    }

    /// Wait until a token is available.
    pub async fn wait(&self) {
        self.limiter.until_ready().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    #[test]
    fn test_zero_rate_means_unlimited() {
        assert!(RateLimiter::from_rate(0).is_none());
        assert!(RateLimiter::from_rate(10).is_some());
    }

    #[tokio::test]
    async fn test_burst_is_immediate() {
        let limiter = RateLimiter::from_rate(100).unwrap();
        let start = Instant::now();
        for _ in 0..10 {
            limiter.wait().await;
        }
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_rate_limiter_paces_waits() {
        let limiter = RateLimiter::from_rate(2).unwrap();
        let start = Instant::now();
        for _ in 0..4 {
            limiter.wait().await;
        }
        // Burst of two is immediate; the next two each wait ~500ms.
        assert!(start.elapsed() >= Duration::from_millis(400));
    }

    #[tokio::test]
    async fn test_clones_share_bucket() {
        let limiter = RateLimiter::from_rate(4).unwrap();
        let clone = limiter.clone();
        let start = Instant::now();

        // Four tokens drained through the original leave none for the clone.
        for _ in 0..4 {
            limiter.wait().await;
        }
        clone.wait().await;
        assert!(start.elapsed() >= Duration::from_millis(200));
    }
}
