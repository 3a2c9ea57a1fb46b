//! Sites that are registered but never crawled
//!
//! Their terms of service forbid scraping. They stay in the registry so the
//! identifiers are recognized, and always refuse to build seed URLs.

use crate::sites::{AdapterError, SiteAdapter};
use std::sync::Arc;
use url::Url;

#[derive(Debug, Clone, Copy)]
pub struct RestrictedSite {
    pub id: &'static str,
    pub domains: &'static [&'static str],
    pub reason: &'static str,
}

impl SiteAdapter for RestrictedSite {
    fn id(&self) -> &'static str {
        self.id
    }

    fn domains(&self) -> &'static [&'static str] {
        self.domains
    }

    fn restricted(&self) -> bool {
        true
    }

    fn build_seed_urls(
        &self,
        _query: &str,
        _location: Option<&str>,
    ) -> Result<Vec<Url>, AdapterError> {
        Err(AdapterError::Unsupported {
            site: self.id,
            reason: self.reason,
        })
    }
}

pub const LINKEDIN: RestrictedSite = RestrictedSite {
    id: "linkedin",
    domains: &["www.linkedin.com", "linkedin.com"],
    reason: "use official feeds, APIs or partner integrations",
};

pub const TIETALENT: RestrictedSite = RestrictedSite {
    id: "tietalent",
    domains: &["www.tietalent.com", "tietalent.com"],
    reason: "use their partner API or export features",
};

pub(super) fn linkedin() -> Arc<dyn SiteAdapter> {
    Arc::new(LINKEDIN)
}

pub(super) fn tietalent() -> Arc<dyn SiteAdapter> {
    Arc::new(TIETALENT)
}
