//! HTML link extraction
//!
//! Extracts anchor targets from a page and resolves them to absolute URLs.

use crate::extract::LinkExtractor;
use scraper::{Html, Selector};
use url::Url;

/// Link extractor backed by a full HTML parse
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` anywhere in the document
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs
/// - Fragment-only links (same page anchors)
/// - Anything that does not resolve to HTTP(S)
///
/// Fragments are stripped from the resolved URLs. Document order is kept
/// and duplicates are not removed.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlLinkExtractor;

impl LinkExtractor for HtmlLinkExtractor {
    fn links(&self, markup: &str, base_url: &Url) -> Vec<Url> {
        let document = Html::parse_document(markup);
        extract_links(&document, base_url)
    }
}

/// Extracts all valid links from a parsed document
fn extract_links(document: &Html, base_url: &Url) -> Vec<Url> {
    let mut links = Vec::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            if element.value().attr("download").is_some() {
                continue;
            }

            if let Some(href) = element.value().attr("href") {
                if let Some(absolute_url) = resolve_link(href, base_url) {
                    links.push(absolute_url);
                }
            }
        }
    }

    links
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
        || lowered.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(mut absolute_url) => {
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                absolute_url.set_fragment(None);
                Some(absolute_url)
            } else {
                None
            }
        }
        Err(_) => None,
    }
}
