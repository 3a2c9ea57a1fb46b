//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that coordinates all aspects of
//! the crawling process, including:
//! - Running one state machine per site, concurrently
//! - Managing each site's frontier and the shared visited set
//! - Coordinating fetching, record extraction, and link discovery
//! - Handling cancellation
//! - Collecting records into the deduplicator

use crate::config::Config;
use crate::crawler::scheduler::{FetchSlots, Frontier, VisitedSet};
use crate::crawler::{FetchResult, Fetcher};
use crate::output::{Deduplicator, RecordSink, RunSummary, SiteReport};
use crate::record::JobRecord;
use crate::sites::{resolve_sites, SiteAdapter};
use crate::state::SiteState;
use crate::url::{extract_domain, host_allowed};
use crate::JobsweepError;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Records buffered between site tasks and the collector
const RECORD_CHANNEL_CAPACITY: usize = 256;

/// State shared by every site task
struct CrawlContext {
    config: Arc<Config>,
    fetcher: Arc<Fetcher>,
    visited: VisitedSet,
    slots: FetchSlots,
    cancel: CancellationToken,
}

/// Main crawler structure
///
/// One `Crawler` performs one run. All politeness state (robots.txt
/// policies, per-host delays, visited URLs) starts empty and is discarded
/// with it.
pub struct Crawler {
    context: Arc<CrawlContext>,
    adapters: Vec<Arc<dyn SiteAdapter>>,
}

impl Crawler {
    /// Creates a crawler for the sites named in the configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Ready to run
    /// * `Err(JobsweepError)` - Unknown site or HTTP client failure
    pub fn new(config: Config) -> Result<Self, JobsweepError> {
        let adapters = resolve_sites(&config.search.sites)?;
        Self::with_adapters(config, adapters)
    }

    /// Creates a crawler for an explicit set of adapters
    ///
    /// The site list in the configuration is ignored.
    pub fn with_adapters(
        config: Config,
        adapters: Vec<Arc<dyn SiteAdapter>>,
    ) -> Result<Self, JobsweepError> {
        let fetcher = Fetcher::from_config(&config)?;
        let slots = FetchSlots::new(config.crawler.concurrency as usize);

        Ok(Self {
            context: Arc::new(CrawlContext {
                config: Arc::new(config),
                fetcher: Arc::new(fetcher),
                visited: VisitedSet::new(),
                slots,
                cancel: CancellationToken::new(),
            }),
            adapters,
        })
    }

    /// Replaces the run's cancellation signal with an external one
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        if let Some(context) = Arc::get_mut(&mut self.context) {
            context.cancel = cancel;
        }
        self
    }

    /// Returns a handle that cancels the run when triggered
    pub fn cancellation_token(&self) -> CancellationToken {
        self.context.cancel.clone()
    }

    /// Runs every site to exhaustion and writes kept records to `sinks`
    ///
    /// Per-URL failures are counted, not returned. A sink that fails to
    /// flush is reported in [`RunSummary::output_error`]. The run completes when
    /// every site has reached `Exhausted`; after cancellation that happens
    /// at the next suspension point, and records collected so far are
    /// still written.
    pub async fn run(&self, sinks: Vec<Box<dyn RecordSink>>) -> Result<RunSummary, JobsweepError> {
        let started_at = Utc::now();
        tracing::info!("Starting crawl of {} site(s)", self.adapters.len());

        let (tx, rx) = mpsc::channel::<JobRecord>(RECORD_CHANNEL_CAPACITY);
        let collector = tokio::spawn(collect_records(rx, Deduplicator::new(sinks)));

        let mut handles = Vec::with_capacity(self.adapters.len());
        for adapter in &self.adapters {
            let context = Arc::clone(&self.context);
            let adapter = Arc::clone(adapter);
            let tx = tx.clone();
            let site = adapter.id();
            handles.push((site, tokio::spawn(crawl_site(context, adapter, tx))));
        }
        drop(tx);

        let mut reports = Vec::with_capacity(handles.len());
        for (site, handle) in handles {
            match handle.await {
                Ok(report) => reports.push(report),
                Err(e) => {
                    tracing::error!("Crawl task for {} failed: {}", site, e);
                    let mut report = SiteReport::new(site);
                    report.state = SiteState::Exhausted;
                    reports.push(report);
                }
            }
        }

        let mut dedup = collector
            .await
            .map_err(|e| JobsweepError::Collector(e.to_string()))?;
        let output_error = dedup.finish().err().map(|e| e.to_string());

        let mut summary = RunSummary::from_reports(
            started_at,
            Utc::now(),
            reports,
            dedup.collected(),
            dedup.kept(),
            self.context.cancel.is_cancelled(),
        );
        summary.output_error = output_error;

        tracing::info!(
            "Crawl finished: {} collected, {} unique kept, {} pages fetched in {:.1}s",
            summary.collected,
            summary.kept,
            summary.pages_fetched,
            summary.duration_seconds()
        );

        Ok(summary)
    }
}

/// Drains the record channel into the deduplicator
///
/// Sink errors are logged by the deduplicator and do not stop collection.
async fn collect_records(mut rx: mpsc::Receiver<JobRecord>, mut dedup: Deduplicator) -> Deduplicator {
    while let Some(record) = rx.recv().await {
        let _ = dedup.submit(record);
    }
    dedup
}

/// Runs one site's state machine: `Seed -> Running -> Exhausted`
async fn crawl_site(
    context: Arc<CrawlContext>,
    adapter: Arc<dyn SiteAdapter>,
    tx: mpsc::Sender<JobRecord>,
) -> SiteReport {
    let site = adapter.id();
    let mut report = SiteReport::new(site);
    let mut state = SiteState::Seed;

    let search = &context.config.search;
    let seeds = match adapter.build_seed_urls(&search.query, search.location.as_deref()) {
        Ok(seeds) => seeds,
        Err(e) => {
            tracing::warn!("Skipping {}: {}", site, e);
            report.skipped = Some(e.to_string());
            finish_site(&mut state, &mut report);
            return report;
        }
    };

    let mut frontier = Frontier::new(site);
    frontier.extend(seeds);
    advance(&mut state, SiteState::Running, site);

    let max_pages = u64::from(context.config.crawler.max_pages);
    while report.pages_fetched < max_pages {
        if context.cancel.is_cancelled() {
            tracing::info!("{}: cancelled with {} URL(s) queued", site, frontier.len());
            break;
        }

        let url = match frontier.pop() {
            Some(queued) => queued.url,
            None => break,
        };

        if !host_is_allowed(&context.config, &url) {
            tracing::trace!("{}: outside allow-list, skipping {}", site, url);
            continue;
        }

        if !context.visited.insert_if_absent(&url) {
            tracing::trace!("{}: already visited {}", site, url);
            continue;
        }

        let permit = tokio::select! {
            biased;
            _ = context.cancel.cancelled() => break,
            permit = context.slots.acquire() => permit,
        };
        let permit = match permit {
            Some(permit) => permit,
            None => break,
        };

        tracing::debug!("{}: fetching {}", site, url);
        let result = tokio::select! {
            biased;
            _ = context.cancel.cancelled() => break,
            result = context.fetcher.fetch(&url) => result,
        };
        drop(permit);

        match result {
            FetchResult::Success {
                final_url, body, ..
            } => {
                report.pages_fetched += 1;
                if final_url != url {
                    context.visited.insert_if_absent(&final_url);
                }

                let records = adapter.parse_job_page(&body, &final_url);
                if !records.is_empty() {
                    tracing::debug!("{}: {} record(s) on {}", site, records.len(), final_url);
                }
                for record in records {
                    report.records += 1;
                    if tx.send(record).await.is_err() {
                        tracing::error!("{}: record collector is gone, stopping", site);
                        finish_site(&mut state, &mut report);
                        return report;
                    }
                }

                let listing = adapter.parse_list_page(&body, &final_url);
                enqueue_unvisited(&context.visited, &mut frontier, listing.job_links);
                enqueue_unvisited(&context.visited, &mut frontier, listing.next_page);
            }
            FetchResult::Disallowed => {
                report.policy_denied += 1;
            }
            FetchResult::HttpError { .. } | FetchResult::NetworkError { .. } => {
                report.fetch_failures += 1;
            }
        }
    }

    if report.pages_fetched >= max_pages {
        tracing::info!("{}: page budget of {} reached", site, max_pages);
    }

    finish_site(&mut state, &mut report);
    report
}

/// Queues discovered URLs that no task has claimed yet, in order
fn enqueue_unvisited<I: IntoIterator<Item = Url>>(
    visited: &VisitedSet,
    frontier: &mut Frontier,
    urls: I,
) {
    frontier.extend(urls.into_iter().filter(|url| !visited.contains(url)));
}

fn host_is_allowed(config: &Config, url: &Url) -> bool {
    match extract_domain(url) {
        Some(host) => host_allowed(&config.crawler.domain_allow, &host),
        None => false,
    }
}

fn advance(state: &mut SiteState, next: SiteState, site: &str) {
    match state.transition(next) {
        Ok(()) => tracing::info!("{}: {}", site, state),
        Err(e) => tracing::error!("{}: {}", site, e),
    }
}

fn finish_site(state: &mut SiteState, report: &mut SiteReport) {
    advance(state, SiteState::Exhausted, report.site);
    tracing::info!(
        "{}: {} page(s) fetched, {} record(s), {} failure(s)",
        report.site,
        report.pages_fetched,
        report.records,
        report.fetch_failures
    );
    report.state = *state;
}
