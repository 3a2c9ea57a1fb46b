//! Search-driven job boards
//!
//! These boards embed JSON-LD on their detail pages and expose a plain GET
//! search form, so they only differ in the search URL they are seeded with.

use crate::sites::{AdapterError, SiteAdapter};
use std::sync::Arc;
use url::Url;

/// A job board seeded from a single search URL
#[derive(Debug, Clone, Copy)]
pub struct SearchBoard {
    pub id: &'static str,
    pub domains: &'static [&'static str],
    pub base: &'static str,
    pub query_param: &'static str,
    /// `None` when the board has no location filter
    pub location_param: Option<&'static str>,
}

impl SearchBoard {
    /// Builds the search URL with form-encoded parameters
    pub fn search_url(&self, query: &str, location: Option<&str>) -> Result<Url, url::ParseError> {
        let mut params = vec![(self.query_param, query)];
        if let (Some(param), Some(location)) = (self.location_param, location) {
            if !location.trim().is_empty() {
                params.push((param, location));
            }
        }
        Url::parse_with_params(self.base, &params)
    }
}

impl SiteAdapter for SearchBoard {
    fn id(&self) -> &'static str {
        self.id
    }

    fn domains(&self) -> &'static [&'static str] {
        self.domains
    }

    fn build_seed_urls(
        &self,
        query: &str,
        location: Option<&str>,
    ) -> Result<Vec<Url>, AdapterError> {
        Ok(vec![self.search_url(query, location)?])
    }
}

pub const JOBS_CH: SearchBoard = SearchBoard {
    id: "jobs.ch",
    domains: &["www.jobs.ch", "jobs.ch"],
    base: "https://www.jobs.ch/en/vacancies/",
    query_param: "term",
    location_param: Some("location"),
};

pub const INDEED: SearchBoard = SearchBoard {
    id: "indeed.ch",
    domains: &["ch.indeed.com", "www.indeed.ch", "indeed.ch", "www.indeed.com"],
    base: "https://ch.indeed.com/jobs",
    query_param: "q",
    location_param: Some("l"),
};

pub const AURAWOO: SearchBoard = SearchBoard {
    id: "aurawoo",
    domains: &["aurawoo.com", "www.aurawoo.com"],
    base: "https://www.aurawoo.com/jobs/",
    query_param: "s",
    location_param: None,
};

pub const SWISSMEDICSJOBS: SearchBoard = SearchBoard {
    id: "swissmedicsjobs",
    domains: &["swissmedicsjobs.com", "www.swissmedicsjobs.com"],
    base: "https://www.swissmedicsjobs.com/jobs",
    query_param: "search",
    location_param: Some("location"),
};

pub const ADECCO: SearchBoard = SearchBoard {
    id: "adecco.ch",
    domains: &["www.adecco.ch", "adecco.ch"],
    base: "https://www.adecco.ch/en-us/jobs",
    query_param: "k",
    location_param: Some("l"),
};

pub const JOBBOARDFINDER: SearchBoard = SearchBoard {
    id: "jobboardfinder",
    domains: &["www.jobboardfinder.com", "jobboardfinder.com"],
    base: "https://www.jobboardfinder.com/search",
    query_param: "q",
    location_param: Some("country"),
};

pub(super) fn jobs_ch() -> Arc<dyn SiteAdapter> {
    Arc::new(JOBS_CH)
}

pub(super) fn indeed() -> Arc<dyn SiteAdapter> {
    Arc::new(INDEED)
}

pub(super) fn aurawoo() -> Arc<dyn SiteAdapter> {
    Arc::new(AURAWOO)
}

pub(super) fn swissmedicsjobs() -> Arc<dyn SiteAdapter> {
    Arc::new(SWISSMEDICSJOBS)
}

pub(super) fn adecco() -> Arc<dyn SiteAdapter> {
    Arc::new(ADECCO)
}

pub(super) fn jobboardfinder() -> Arc<dyn SiteAdapter> {
    Arc::new(JOBBOARDFINDER)
}
