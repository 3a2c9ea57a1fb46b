//! Page extraction
//!
//! Two seams sit between fetched markup and the crawler:
//! [`LinkExtractor`] turns a page into outgoing links and
//! [`StructuredDataExtractor`] turns it into job records. The defaults are
//! chosen at build time through [`DefaultLinkExtractor`] and
//! [`DefaultStructuredDataExtractor`].

mod jsonld;
mod links;
pub mod text;

pub use jsonld::JsonLdExtractor;
pub use links::{resolve_link, HtmlLinkExtractor};

use crate::record::JobRecord;
use url::Url;

/// Extracts absolute outgoing links from a page
pub trait LinkExtractor: Send + Sync {
    /// Returns every followable link in document order
    fn links(&self, markup: &str, base_url: &Url) -> Vec<Url>;
}

/// Extracts job records embedded in a page
pub trait StructuredDataExtractor: Send + Sync {
    /// Returns every job record found, with `source` left unset
    fn extract(&self, markup: &str, base_url: &Url) -> Vec<JobRecord>;
}

pub type DefaultLinkExtractor = HtmlLinkExtractor;
pub type DefaultStructuredDataExtractor = JsonLdExtractor;
