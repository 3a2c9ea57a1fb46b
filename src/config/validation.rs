use crate::config::types::{Config, CrawlerConfig, SearchConfig, UserAgentConfig};
use crate::ConfigError;

/// Validates the entire configuration
///
/// Site identifiers are resolved against the registry here, so an unknown
/// site is reported before any crawling starts.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_search_config(&config.search)?;
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    Ok(())
}

/// Validates the search parameters
fn validate_search_config(config: &SearchConfig) -> Result<(), ConfigError> {
    if config.query.trim().is_empty() {
        return Err(ConfigError::Validation("query cannot be empty".to_string()));
    }

    if config.sites.is_empty() {
        return Err(ConfigError::Validation(
            "at least one site must be configured".to_string(),
        ));
    }

    crate::sites::resolve_sites(&config.sites)?;

    Ok(())
}

/// Longest accepted politeness delay
const MAX_DELAY_MS: u64 = 600_000;

/// Longest accepted base retry backoff
const MAX_RETRY_BACKOFF_MS: u64 = 60_000;

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.concurrency < 1 || config.concurrency > 100 {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and 100, got {}",
            config.concurrency
        )));
    }

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "timeout must be greater than zero".to_string(),
        ));
    }

    if config.max_retries < 1 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be >= 1, got {}",
            config.max_retries
        )));
    }

    if config.delay_ms > MAX_DELAY_MS {
        return Err(ConfigError::Validation(format!(
            "delay must be at most {}ms, got {}",
            MAX_DELAY_MS, config.delay_ms
        )));
    }

    if config.retry_backoff_ms > MAX_RETRY_BACKOFF_MS {
        return Err(ConfigError::Validation(format!(
            "retry backoff must be at most {}ms, got {}",
            MAX_RETRY_BACKOFF_MS, config.retry_backoff_ms
        )));
    }

    for pattern in &config.domain_allow {
        validate_domain_pattern(pattern)?;
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.header.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user agent cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates an allow-list pattern (supports a leading `*.`)
fn validate_domain_pattern(pattern: &str) -> Result<(), ConfigError> {
    if pattern.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain pattern cannot be empty".to_string(),
        ));
    }

    let domain = pattern.strip_prefix("*.").unwrap_or(pattern);
    validate_domain_string(domain)
}

/// Validates a domain string (without wildcard prefix)
fn validate_domain_string(domain: &str) -> Result<(), ConfigError> {
    if domain.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain cannot be empty".to_string(),
        ));
    }

    if !domain
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' contains invalid characters",
            domain
        )));
    }

    if domain.starts_with('.')
        || domain.ends_with('.')
        || domain.starts_with('-')
        || domain.ends_with('-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot start or end with '.' or '-'",
            domain
        )));
    }

    if domain.contains("..") {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot contain consecutive dots",
            domain
        )));
    }

    Ok(())
}
