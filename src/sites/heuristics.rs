//! Default listing-page heuristic
//!
//! Job boards rarely share markup, but their URLs tend to give detail pages
//! and pagination away. Matching is substring based and best-effort: false
//! positives are filtered later by the visited set and the page budget,
//! false negatives simply mean a posting is not reached.

use crate::extract::LinkExtractor;
use crate::url::same_host;
use std::collections::HashSet;
use url::Url;

/// Substrings that mark a link as a likely job detail page
pub const JOB_HINTS: [&str; 6] = ["job", "jobs", "stelle", "vacanc", "offer", "position"];

/// Query fragments that mark a link as pagination
pub const PAGINATION_PARAMS: [&str; 5] = ["page=", "seite=", "pagenumber=", "start=", "offset="];

/// Links discovered on a listing page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPage {
    /// Same-host job-like links, deduplicated in first-seen order
    pub job_links: Vec<Url>,

    /// The next listing page, if one was found
    pub next_page: Option<Url>,
}

/// Runs the default heuristic over a page's markup
pub fn default_list_page<E: LinkExtractor + ?Sized>(
    extractor: &E,
    markup: &str,
    page_url: &Url,
) -> ListPage {
    let links = extractor.links(markup, page_url);
    classify_links(&links, page_url)
}

/// Splits extracted links into job candidates and a next-page link
///
/// The next page is the first pagination link that is neither the current
/// page nor an earlier one. Job-like pagination links stay job candidates,
/// except for the chosen next page, which is queued behind the detail pages
/// found with it.
pub fn classify_links(links: &[Url], page_url: &Url) -> ListPage {
    let mut seen = HashSet::new();
    let mut page = ListPage::default();
    let current_position = page_position(page_url);

    for link in links.iter().filter(|link| same_host(link, page_url)) {
        if is_same_page(link, page_url) {
            continue;
        }

        if page.next_page.is_none()
            && is_pagination(link)
            && !is_earlier_page(link, current_position.as_ref())
        {
            page.next_page = Some(link.clone());
        }

        if is_job_like(link) && seen.insert(link.as_str().to_string()) {
            page.job_links.push(link.clone());
        }
    }

    if let Some(next) = &page.next_page {
        page.job_links.retain(|link| link != next);
    }

    page
}

/// Path and query, lowercased, which is what both heuristics inspect
fn match_target(url: &Url) -> String {
    match url.query() {
        Some(query) => format!("{}?{}", url.path(), query).to_lowercase(),
        None => url.path().to_lowercase(),
    }
}

fn is_job_like(url: &Url) -> bool {
    let target = match_target(url);
    JOB_HINTS.iter().any(|hint| target.contains(hint))
}

fn is_pagination(url: &Url) -> bool {
    match url.query() {
        Some(query) => {
            let query = query.to_lowercase();
            PAGINATION_PARAMS.iter().any(|param| query.contains(param))
        }
        None => false,
    }
}

/// The first numeric pagination parameter of a URL, as `(name, value)`
fn page_position(url: &Url) -> Option<(String, u64)> {
    url.query_pairs().find_map(|(name, value)| {
        let name = name.to_lowercase();
        let is_param = PAGINATION_PARAMS
            .iter()
            .any(|param| param.strip_suffix('=') == Some(name.as_str()));
        if !is_param {
            return None;
        }
        value.trim().parse::<u64>().ok().map(|value| (name, value))
    })
}

/// Whether `link` points at or before the current page of the same pager
fn is_earlier_page(link: &Url, current: Option<&(String, u64)>) -> bool {
    match (page_position(link), current) {
        (Some((name, value)), Some((current_name, current_value))) => {
            name == *current_name && value <= *current_value
        }
        _ => false,
    }
}

fn is_same_page(link: &Url, page_url: &Url) -> bool {
    let mut current = page_url.clone();
    current.set_fragment(None);
    link.as_str() == current.as_str()
}
