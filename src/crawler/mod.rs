//! Crawler module for polite, concurrent job-board harvesting
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with robots.txt checks and retry logic
//! - Per-host politeness delays
//! - Frontier and visited-set management
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod rate_limiter;
mod scheduler;

pub use coordinator::Crawler;
pub use fetcher::{build_http_client, FetchResult, Fetcher};
pub use rate_limiter::RateLimiter;
pub use scheduler::{FetchSlots, Frontier, QueuedUrl, VisitedSet};

use crate::config::Config;
use crate::output::{open_sinks, RunSummary};
use crate::JobsweepError;
use tokio_util::sync::CancellationToken;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Resolve the configured sites
/// 2. Open the configured output sinks
/// 3. Build the HTTP client, policy cache and rate limiter
/// 4. Crawl every site until it is exhausted or `cancel` fires
/// 5. Return the run summary
///
/// # Arguments
///
/// * `config` - A validated configuration
/// * `cancel` - Cancels the run at the next suspension point
///
/// # Returns
///
/// * `Ok(RunSummary)` - Crawl completed, possibly cancelled
/// * `Err(JobsweepError)` - Configuration or output setup failed
///
/// # Example
///
/// ```no_run
/// use jobsweep::config::{load_config, validate};
/// use jobsweep::crawler::crawl;
/// use std::path::Path;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("jobsweep.toml"))?;
/// validate(&config)?;
/// let summary = crawl(config, CancellationToken::new()).await?;
/// println!("kept {} of {}", summary.kept, summary.collected);
/// # Ok(())
/// # }
/// ```
pub async fn crawl(config: Config, cancel: CancellationToken) -> Result<RunSummary, JobsweepError> {
    let sinks = open_sinks(&config.output)?;
    let crawler = Crawler::new(config)?.with_cancellation(cancel);
    crawler.run(sinks).await
}
