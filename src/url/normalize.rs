use crate::UrlError;
use url::form_urlencoded;
use url::Url;

/// List of tracking query parameters to remove during normalization
const TRACKING_PARAMS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "fbclid",
    "gclid",
    "mc_eid",
    "ref",
];

/// Normalizes a URL into the key used by the crawl's visited set
///
/// Two URLs that normalize to the same string are treated as the same page
/// and fetched at most once per run. The normalized form is only a key; the
/// crawler still requests the URL as it was discovered.
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed or not HTTP(S)
/// 2. Lowercase the host and remove a `www.` prefix
/// 3. Normalize the path:
///    - Remove dot segments (. and ..) and repeated slashes
///    - Remove trailing slash (except for root /)
/// 4. Remove the fragment
/// 5. Remove tracking query parameters
/// 6. Sort remaining query parameters by key (stable, so repeated keys keep
///    their relative order)
/// 7. Remove an empty query string
///
/// # Examples
///
/// ```
/// use jobsweep::url::normalize_url;
///
/// let url = normalize_url("https://WWW.JOBS.CH/en/vacancies/?term=nurse#top").unwrap();
/// assert_eq!(url.as_str(), "https://jobs.ch/en/vacancies?term=nurse");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if let Some(host) = url.host_str() {
        let lowered = host.to_lowercase();
        let normalized_host = lowered.strip_prefix("www.").unwrap_or(&lowered).to_string();

        url.set_host(Some(&normalized_host))
            .map_err(|e| UrlError::Malformed(format!("Failed to set host: {}", e)))?;
    } else {
        return Err(UrlError::MissingDomain);
    }

    let normalized_path = normalize_path(url.path());
    url.set_path(&normalized_path);

    url.set_fragment(None);

    if url.query().is_some() {
        let params = filter_and_sort_query_params(&url);

        if params.is_empty() {
            url.set_query(None);
        } else {
            let query_string = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(params.iter())
                .finish();
            url.set_query(Some(&query_string));
        }
    }

    Ok(url)
}

/// Returns the visited-set key for a URL, or `None` if it cannot be normalized
pub fn visit_key(url_str: &str) -> Option<String> {
    normalize_url(url_str).ok().map(String::from)
}

/// Normalizes a URL path by removing dot segments and trailing slashes
fn normalize_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }

    if segments.is_empty() {
        return "/".to_string();
    }

    format!("/{}", segments.join("/"))
}

/// Filters out tracking parameters and sorts remaining query parameters
fn filter_and_sort_query_params(url: &Url) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !is_tracking_param(key))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    params.sort_by(|a, b| a.0.cmp(&b.0));

    params
}

/// Checks if a query parameter is a tracking parameter
fn is_tracking_param(key: &str) -> bool {
    TRACKING_PARAMS.contains(&key) || key.starts_with("utm_")
}
