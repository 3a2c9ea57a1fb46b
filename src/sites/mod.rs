//! Site adapters and the site registry
//!
//! A [`SiteAdapter`] isolates everything specific to one job board: how its
//! search URLs are built, which links on a listing page matter, and how a
//! detail page turns into records. Adding a board means adding one adapter
//! and one [`REGISTRY`] entry; nothing else in the crawler changes.

mod boards;
pub mod heuristics;
mod restricted;

pub use boards::SearchBoard;
pub use heuristics::ListPage;
pub use restricted::RestrictedSite;

use crate::extract::{
    DefaultLinkExtractor, DefaultStructuredDataExtractor, StructuredDataExtractor,
};
use crate::record::JobRecord;
use crate::ConfigError;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use url::Url;

/// Why an adapter produced no seed URLs
///
/// The crawler skips the site on either variant; neither aborts the run.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("{site} is not supported: {reason}")]
    Unsupported {
        site: &'static str,
        reason: &'static str,
    },

    #[error("Invalid seed URL: {0}")]
    InvalidSeed(#[from] url::ParseError),
}

/// Per-site URL construction and page parsing
pub trait SiteAdapter: Send + Sync {
    /// Source identifier stamped on every record from this site
    fn id(&self) -> &'static str;

    /// Hosts this site serves pages from
    fn domains(&self) -> &'static [&'static str];

    /// True for sites whose terms of service forbid scraping
    fn restricted(&self) -> bool {
        false
    }

    /// Builds the initial search URLs for a query
    fn build_seed_urls(&self, query: &str, location: Option<&str>)
        -> Result<Vec<Url>, AdapterError>;

    /// Finds job-like links and the next listing page
    fn parse_list_page(&self, markup: &str, url: &Url) -> ListPage {
        heuristics::default_list_page(&DefaultLinkExtractor::default(), markup, url)
    }

    /// Extracts the records embedded in a page
    fn parse_job_page(&self, markup: &str, url: &Url) -> Vec<JobRecord> {
        DefaultStructuredDataExtractor::default()
            .extract(markup, url)
            .into_iter()
            .map(|record| record.with_source(self.id()))
            .collect()
    }
}

/// A named registry entry
pub struct RegistryEntry {
    /// Canonical identifier accepted on the command line
    pub name: &'static str,

    /// Alternative identifiers
    pub aliases: &'static [&'static str],

    /// Builds the adapter
    pub build: fn() -> Arc<dyn SiteAdapter>,
}

impl RegistryEntry {
    fn matches(&self, identifier: &str) -> bool {
        self.name == identifier || self.aliases.contains(&identifier)
    }
}

/// Every site this build knows about
pub static REGISTRY: &[RegistryEntry] = &[
    RegistryEntry {
        name: "jobs.ch",
        aliases: &["jobsch", "jobs"],
        build: boards::jobs_ch,
    },
    RegistryEntry {
        name: "indeed",
        aliases: &["indeed.ch", "indeedch"],
        build: boards::indeed,
    },
    RegistryEntry {
        name: "aurawoo",
        aliases: &[],
        build: boards::aurawoo,
    },
    RegistryEntry {
        name: "swissmedicsjobs",
        aliases: &[],
        build: boards::swissmedicsjobs,
    },
    RegistryEntry {
        name: "adecco",
        aliases: &["adecco.ch"],
        build: boards::adecco,
    },
    RegistryEntry {
        name: "jobboardfinder",
        aliases: &[],
        build: boards::jobboardfinder,
    },
    RegistryEntry {
        name: "linkedin",
        aliases: &[],
        build: restricted::linkedin,
    },
    RegistryEntry {
        name: "tietalent",
        aliases: &[],
        build: restricted::tietalent,
    },
];

/// Identifier that expands to every unrestricted site
pub const ALL_SITES: &str = "all";

/// Resolves site identifiers to adapters
///
/// Identifiers are case-insensitive. `all` expands to every site that is
/// not restricted. A site named twice (directly or through an alias) is
/// crawled once.
///
/// # Errors
///
/// Returns `ConfigError::UnknownSite` for an identifier not in the registry.
pub fn resolve_sites(identifiers: &[String]) -> Result<Vec<Arc<dyn SiteAdapter>>, ConfigError> {
    let mut adapters: Vec<Arc<dyn SiteAdapter>> = Vec::new();
    let mut seen = HashSet::new();

    for identifier in identifiers {
        let identifier = identifier.trim().to_lowercase();
        if identifier.is_empty() {
            continue;
        }

        if identifier == ALL_SITES {
            for entry in REGISTRY {
                let adapter = (entry.build)();
                if !adapter.restricted() && seen.insert(entry.name) {
                    adapters.push(adapter);
                }
            }
            continue;
        }

        let entry = REGISTRY
            .iter()
            .find(|entry| entry.matches(&identifier))
            .ok_or_else(|| ConfigError::UnknownSite(identifier.clone()))?;

        if seen.insert(entry.name) {
            adapters.push((entry.build)());
        }
    }

    Ok(adapters)
}

/// Canonical names of every registered site
pub fn site_names() -> Vec<&'static str> {
    REGISTRY.iter().map(|entry| entry.name).collect()
}
