//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with the configured user agent and timeouts
//! - Consulting the robots.txt policy before any network call
//! - Waiting out the per-host politeness delay before every attempt
//! - Retrying failed attempts with exponential backoff

use crate::config::Config;
use crate::crawler::RateLimiter;
use crate::robots::PolicyCache;
use rand::Rng;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const ACCEPT_LANGUAGES: &str = "en-US,en;q=0.8,de-CH;q=0.7";

/// Upper bound of the connect phase, capped by the request timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the page
    Success {
        /// Final URL after redirects
        final_url: Url,
        /// HTTP status code
        status_code: u16,
        /// Page body, whatever its content type
        body: String,
    },

    /// robots.txt disallows the URL; no request was sent
    Disallowed,

    /// The last attempt returned a non-success status
    HttpError {
        /// The HTTP status code of the last attempt
        status_code: u16,
        /// Number of attempts made
        attempts: u32,
    },

    /// The last attempt failed in transport (connect, timeout, body read)
    NetworkError {
        /// Error description
        error: String,
        /// Number of attempts made
        attempts: u32,
    },
}

impl FetchResult {
    pub fn is_success(&self) -> bool {
        matches!(self, FetchResult::Success { .. })
    }
}

/// Outcome of a single attempt that did not succeed
enum AttemptFailure {
    Status(u16),
    Transport(String),
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The run configuration; supplies the user agent and timeout
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use jobsweep::config::Config;
/// use jobsweep::crawler::build_http_client;
///
/// let client = build_http_client(&Config::default()).unwrap();
/// ```
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGES));

    let timeout = config.crawler.timeout();

    Client::builder()
        .user_agent(config.user_agent.header.as_str())
        .default_headers(headers)
        .timeout(timeout)
        .connect_timeout(timeout.min(CONNECT_TIMEOUT))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Politeness-aware page fetcher
///
/// Every call consults the [`PolicyCache`] first and never touches the
/// network for a disallowed URL. Each attempt, retries included, waits on
/// the [`RateLimiter`] before dispatch.
pub struct Fetcher {
    client: Client,
    policy: Arc<PolicyCache>,
    limiter: Arc<RateLimiter>,
    max_attempts: u32,
    retry_backoff: Duration,
}

impl Fetcher {
    pub fn new(
        client: Client,
        policy: Arc<PolicyCache>,
        limiter: Arc<RateLimiter>,
        max_attempts: u32,
        retry_backoff: Duration,
    ) -> Self {
        Self {
            client,
            policy,
            limiter,
            max_attempts: max_attempts.max(1),
            retry_backoff,
        }
    }

    /// Builds a fetcher, its client, policy cache and rate limiter from a config
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let client = build_http_client(config)?;
        let policy = Arc::new(PolicyCache::new(client.clone(), &config.user_agent.header));
        let limiter = Arc::new(RateLimiter::new(config.crawler.delay()));

        Ok(Self::new(
            client,
            policy,
            limiter,
            config.crawler.max_retries,
            config.crawler.retry_backoff(),
        ))
    }

    pub fn policy(&self) -> &PolicyCache {
        &self.policy
    }

    /// Fetches a URL with full error handling and retry logic
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | Disallowed by robots.txt | Immediate → Disallowed, no request |
    /// | HTTP 2xx | Success |
    /// | Any other status | Retry, then HttpError |
    /// | Transport error or timeout | Retry, then NetworkError |
    ///
    /// The wait before retry `n` is `retry_backoff × 2^(n-1)` plus jitter of
    /// up to 40% of `retry_backoff`.
    pub async fn fetch(&self, url: &Url) -> FetchResult {
        if !self.policy.allowed(url).await {
            tracing::warn!("Disallowed by robots.txt: {}", url);
            return FetchResult::Disallowed;
        }

        let mut attempt = 1;
        loop {
            self.limiter.wait(url).await;

            let failure = match self.attempt(url).await {
                Ok(result) => return result,
                Err(failure) => failure,
            };

            if attempt >= self.max_attempts {
                return match failure {
                    AttemptFailure::Status(status_code) => {
                        tracing::warn!(
                            "Giving up on {} after {} attempts: HTTP {}",
                            url,
                            attempt,
                            status_code
                        );
                        FetchResult::HttpError {
                            status_code,
                            attempts: attempt,
                        }
                    }
                    AttemptFailure::Transport(error) => {
                        tracing::warn!(
                            "Giving up on {} after {} attempts: {}",
                            url,
                            attempt,
                            error
                        );
                        FetchResult::NetworkError {
                            error,
                            attempts: attempt,
                        }
                    }
                };
            }

            let delay = self.backoff(attempt);
            tracing::debug!(
                "Attempt {} for {} failed, retrying in {:?}",
                attempt,
                url,
                delay
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    /// Sends a single GET request
    async fn attempt(&self, url: &Url) -> Result<FetchResult, AttemptFailure> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| AttemptFailure::Transport(describe(&e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AttemptFailure::Status(status.as_u16()));
        }

        let final_url = response.url().clone();
        let body = response
            .text()
            .await
            .map_err(|e| AttemptFailure::Transport(describe(&e)))?;

        Ok(FetchResult::Success {
            final_url,
            status_code: status.as_u16(),
            body,
        })
    }

    fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        let base = self.retry_backoff.saturating_mul(1 << exponent);

        let max_jitter = (self.retry_backoff.as_micros() * 2 / 5) as u64;
        let jitter = if max_jitter == 0 {
            Duration::ZERO
        } else {
            Duration::from_micros(rand::thread_rng().gen_range(0..=max_jitter))
        };

        base.saturating_add(jitter)
    }
}

/// Classifies a transport error for logging
fn describe(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "Request timeout".to_string()
    } else if error.is_connect() {
        "Connection refused".to_string()
    } else {
        error.to_string()
    }
}
