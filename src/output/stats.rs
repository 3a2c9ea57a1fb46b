//! Run statistics and the end-of-run summary
//!
//! Each site task reports its own counters in a [`SiteReport`]; the
//! coordinator folds them together with the deduplicator's counts into a
//! [`RunSummary`].

use crate::state::SiteState;
use chrono::{DateTime, Utc};

/// What one site's crawl did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteReport {
    /// Source identifier of the site
    pub site: &'static str,

    /// State the site finished in
    pub state: SiteState,

    /// Pages fetched successfully (counts toward the page budget)
    pub pages_fetched: u64,

    /// URLs given up on after exhausting retries
    pub fetch_failures: u64,

    /// URLs refused by robots.txt
    pub policy_denied: u64,

    /// Records handed to the deduplicator, before deduplication
    pub records: u64,

    /// Why the site was skipped before any fetch, if it was
    pub skipped: Option<String>,
}

impl SiteReport {
    pub fn new(site: &'static str) -> Self {
        Self {
            site,
            state: SiteState::Seed,
            pages_fetched: 0,
            fetch_failures: 0,
            policy_denied: 0,
            records: 0,
            skipped: None,
        }
    }

    pub fn was_skipped(&self) -> bool {
        self.skipped.is_some()
    }
}

/// Summary statistics for a run
#[derive(Debug, Clone)]
pub struct RunSummary {
    // Run metadata
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub cancelled: bool,

    // Records
    pub collected: u64,
    pub kept: u64,
    pub duplicates: u64,

    // Fetches
    pub pages_fetched: u64,
    pub fetch_failures: u64,
    pub policy_denied: u64,

    // Sites
    pub sites_crawled: u64,
    pub sites_skipped: u64,
    pub sites: Vec<SiteReport>,

    /// Set when a sink failed to flush at the end of the run
    pub output_error: Option<String>,
}

impl RunSummary {
    /// Folds per-site reports and record counts into a summary
    pub fn from_reports(
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        sites: Vec<SiteReport>,
        collected: u64,
        kept: u64,
        cancelled: bool,
    ) -> Self {
        let skipped = sites.iter().filter(|s| s.was_skipped()).count() as u64;

        Self {
            started_at,
            finished_at,
            cancelled,
            collected,
            kept,
            duplicates: collected.saturating_sub(kept),
            pages_fetched: sites.iter().map(|s| s.pages_fetched).sum(),
            fetch_failures: sites.iter().map(|s| s.fetch_failures).sum(),
            policy_denied: sites.iter().map(|s| s.policy_denied).sum(),
            sites_crawled: sites.len() as u64 - skipped,
            sites_skipped: skipped,
            sites,
            output_error: None,
        }
    }

    pub fn duration_seconds(&self) -> f64 {
        (self.finished_at - self.started_at).num_milliseconds() as f64 / 1000.0
    }

    /// Returns the report for one site
    pub fn site(&self, site: &str) -> Option<&SiteReport> {
        self.sites.iter().find(|s| s.site == site)
    }
}

/// Prints the summary to stdout in a formatted manner
pub fn print_summary(summary: &RunSummary) {
    println!("=== Run Summary ===\n");

    println!("Overview:");
    println!(
        "  Started:  {}",
        summary.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!(
        "  Finished: {} ({:.1}s)",
        summary.finished_at.format("%Y-%m-%d %H:%M:%S UTC"),
        summary.duration_seconds()
    );
    if summary.cancelled {
        println!("  Run was cancelled; partial results were written");
    }
    if let Some(error) = &summary.output_error {
        println!("  Output incomplete: {}", error);
    }
    println!();

    println!("Records:");
    println!("  Collected: {}", summary.collected);
    println!("  Unique kept: {}", summary.kept);
    println!("  Duplicates dropped: {}", summary.duplicates);
    println!();

    println!("Fetches:");
    println!("  Pages fetched: {}", summary.pages_fetched);
    println!("  Failures: {}", summary.fetch_failures);
    println!("  Disallowed by robots.txt: {}", summary.policy_denied);
    println!();

    println!(
        "Sites ({} crawled, {} skipped):",
        summary.sites_crawled, summary.sites_skipped
    );
    for site in &summary.sites {
        match &site.skipped {
            Some(reason) => println!("  {}: skipped ({})", site.site, reason),
            None => println!(
                "  {}: {} pages, {} records, {} failures",
                site.site, site.pages_fetched, site.records, site.fetch_failures
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn report(site: &'static str, pages: u64, records: u64) -> SiteReport {
        SiteReport {
            state: SiteState::Exhausted,
            pages_fetched: pages,
            records,
            fetch_failures: 1,
            ..SiteReport::new(site)
        }
    }

    #[test]
    fn test_summary_aggregates_sites() {
        let started = Utc::now();
        let finished = started + Duration::milliseconds(2500);
        let mut skipped = SiteReport::new("linkedin");
        skipped.state = SiteState::Exhausted;
        skipped.skipped = Some("not supported".to_string());

        let summary = RunSummary::from_reports(
            started,
            finished,
            vec![report("jobs.ch", 3, 4), report("indeed.ch", 2, 1), skipped],
            5,
            4,
            false,
        );

        assert_eq!(summary.pages_fetched, 5);
        assert_eq!(summary.fetch_failures, 2);
        assert_eq!(summary.sites_crawled, 2);
        assert_eq!(summary.sites_skipped, 1);
        assert_eq!(summary.duplicates, 1);
        assert_eq!(summary.duration_seconds(), 2.5);
        assert_eq!(summary.site("indeed.ch").map(|s| s.records), Some(1));
        assert!(summary.site("monster").is_none());
    }

    #[test]
    fn test_empty_run() {
        let now = Utc::now();
        let summary = RunSummary::from_reports(now, now, Vec::new(), 0, 0, true);
        assert_eq!(summary.sites_crawled, 0);
        assert_eq!(summary.duplicates, 0);
        assert!(summary.cancelled);
    }
}
