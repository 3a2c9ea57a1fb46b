//! Per-host politeness delay
//!
//! Every host has a "next allowed dispatch" slot. A caller reserves the
//! slot under a short lock, pushes it forward by the base delay plus
//! jitter, and then sleeps until its reservation comes due. Reservation
//! happens before the sleep, so concurrent callers for the same host queue
//! up behind each other instead of all waking at once.

use crate::url::host_key;
use rand::Rng;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;
use url::Url;

/// Enforces a minimum, jittered gap between requests to the same host
#[derive(Debug)]
pub struct RateLimiter {
    base_delay: Duration,
    last_dispatch: Mutex<HashMap<String, Instant>>,
}

impl RateLimiter {
    pub fn new(base_delay: Duration) -> Self {
        Self {
            base_delay,
            last_dispatch: Mutex::new(HashMap::new()),
        }
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Suspends until a request to `url`'s host may be dispatched
    ///
    /// The first request to a host goes out immediately. Each later one
    /// waits until `base_delay + jitter` has passed since the previous
    /// dispatch, with jitter uniform in `[0, base_delay / 4]`. Hosts are
    /// independent of each other.
    pub async fn wait(&self, url: &Url) {
        let host = match host_key(url) {
            Some(host) => host,
            None => return,
        };

        let slot = self.reserve(&host, self.jitter());
        tokio::time::sleep_until(slot).await;
    }

    /// Claims the next dispatch slot for `host` and returns it
    fn reserve(&self, host: &str, jitter: Duration) -> Instant {
        let now = Instant::now();
        let mut last_dispatch = self
            .last_dispatch
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let slot = match last_dispatch.get(host) {
            Some(previous) => (*previous + self.base_delay + jitter).max(now),
            None => now,
        };
        last_dispatch.insert(host.to_string(), slot);

        slot
    }

    fn jitter(&self) -> Duration {
        let max_micros = (self.base_delay.as_micros() / 4) as u64;
        if max_micros == 0 {
            return Duration::ZERO;
        }
        Duration::from_micros(rand::thread_rng().gen_range(0..=max_micros))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_request_is_immediate() {
        let limiter = RateLimiter::new(Duration::from_secs(1));
        let start = Instant::now();

        limiter.wait(&url("https://example.test/a")).await;

        assert_eq!(Instant::now(), start);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sequential_requests_spaced_by_base_delay() {
        let base = Duration::from_millis(800);
        let limiter = RateLimiter::new(base);
        let mut dispatched = Vec::new();

        for i in 0..5 {
            limiter.wait(&url(&format!("https://example.test/jobs/{}", i))).await;
            dispatched.push(Instant::now());
        }

        for pair in dispatched.windows(2) {
            let gap = pair[1] - pair[0];
            assert!(gap >= base, "gap {:?} shorter than {:?}", gap, base);
            assert!(gap <= base + base / 4, "gap {:?} exceeds jitter bound", gap);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_requests_same_host_never_burst() {
        let base = Duration::from_millis(500);
        let limiter = Arc::new(RateLimiter::new(base));
        let mut handles = Vec::new();

        for i in 0..6 {
            let limiter = Arc::clone(&limiter);
            handles.push(tokio::spawn(async move {
                limiter
                    .wait(&Url::parse(&format!("https://example.test/p/{}", i)).unwrap())
                    .await;
                Instant::now()
            }));
        }

        let mut dispatched = Vec::new();
        for handle in handles {
            dispatched.push(handle.await.unwrap());
        }
        dispatched.sort();

        for pair in dispatched.windows(2) {
            assert!(pair[1] - pair[0] >= base);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_hosts_are_independent() {
        let limiter = RateLimiter::new(Duration::from_secs(5));
        let start = Instant::now();

        limiter.wait(&url("https://a.test/1")).await;
        limiter.wait(&url("https://b.test/1")).await;
        limiter.wait(&url("http://a.test:8080/1")).await;

        assert_eq!(Instant::now(), start);
    }

    #[tokio::test(start_paused = true)]
    async fn test_elapsed_time_counts_toward_delay() {
        let base = Duration::from_secs(1);
        let limiter = RateLimiter::new(base);
        let target = url("https://example.test/");

        limiter.wait(&target).await;
        tokio::time::sleep(Duration::from_secs(10)).await;

        let before = Instant::now();
        limiter.wait(&target).await;
        assert_eq!(Instant::now(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_delay_never_waits() {
        let limiter = RateLimiter::new(Duration::ZERO);
        let start = Instant::now();

        for _ in 0..3 {
            limiter.wait(&url("https://example.test/")).await;
        }

        assert_eq!(Instant::now(), start);
    }
}
