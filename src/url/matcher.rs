/// Checks if a host matches one allow-list pattern
///
/// Both pattern forms match the domain itself and any subdomain of it, so
/// "jobs.ch" admits "www.jobs.ch" the same way "*.jobs.ch" does.
///
/// # Examples
///
/// ```
/// use jobsweep::url::matches_allow_pattern;
///
/// assert!(matches_allow_pattern("jobs.ch", "jobs.ch"));
/// assert!(matches_allow_pattern("jobs.ch", "www.jobs.ch"));
/// assert!(matches_allow_pattern("*.indeed.com", "ch.indeed.com"));
/// assert!(!matches_allow_pattern("jobs.ch", "notjobs.ch"));
/// ```
pub fn matches_allow_pattern(pattern: &str, host: &str) -> bool {
    let base = pattern.strip_prefix("*.").unwrap_or(pattern);
    if base.is_empty() {
        return false;
    }
    host == base || host.ends_with(&format!(".{}", base))
}

/// Returns true if `host` passes the allow-list
///
/// An empty allow-list admits every host.
pub fn host_allowed(allow_list: &[String], host: &str) -> bool {
    if allow_list.is_empty() {
        return true;
    }
    let host = host.to_lowercase();
    allow_list
        .iter()
        .any(|pattern| matches_allow_pattern(&pattern.to_lowercase(), &host))
}
