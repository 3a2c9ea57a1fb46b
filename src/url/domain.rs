use url::Url;

/// Extracts the lowercase host from a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use jobsweep::url::extract_domain;
///
/// let url = Url::parse("https://WWW.Jobs.CH/en/vacancies").unwrap();
/// assert_eq!(extract_domain(&url), Some("www.jobs.ch".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns the key politeness state is tracked under: host plus explicit port
///
/// Two servers on the same host but different ports are different targets,
/// so they get separate robots.txt entries and rate-limit clocks.
pub fn host_key(url: &Url) -> Option<String> {
    let host = extract_domain(url)?;
    match url.port() {
        Some(port) => Some(format!("{}:{}", host, port)),
        None => Some(host),
    }
}

/// Returns true if both URLs point at the same host and port
pub fn same_host(a: &Url, b: &Url) -> bool {
    match (host_key(a), host_key(b)) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}
