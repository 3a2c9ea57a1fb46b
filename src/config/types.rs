use serde::Deserialize;
use std::time::Duration;

/// Browser-like user agent sent when none is configured
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0 Safari/537.36 jobsweep/1.0";

/// Main configuration structure for Jobsweep
///
/// Every table is optional in the TOML file; command-line flags are applied
/// on top of whatever the file provides.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub search: SearchConfig,
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

/// What to search for, and where
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Site identifiers, or `["all"]`
    pub sites: Vec<String>,

    /// Free-text query, e.g. "nurse"
    pub query: String,

    /// Optional location filter, e.g. "Zurich"
    pub location: Option<String>,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum number of successfully fetched pages per site
    #[serde(rename = "max-pages")]
    pub max_pages: u32,

    /// Maximum number of concurrently in-flight fetches across all sites
    pub concurrency: u32,

    /// Base politeness delay between requests to the same host (milliseconds)
    #[serde(rename = "delay-ms")]
    pub delay_ms: u64,

    /// Per-fetch timeout (milliseconds)
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,

    /// Maximum attempts per URL, including the first
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Base of the exponential retry backoff (milliseconds)
    #[serde(rename = "retry-backoff-ms")]
    pub retry_backoff_ms: u64,

    /// Host allow-list; empty means every host is allowed
    #[serde(rename = "domain-allow")]
    pub domain_allow: Vec<String>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_pages: 5,
            concurrency: 6,
            delay_ms: 1000,
            timeout_ms: 20_000,
            max_retries: 3,
            retry_backoff_ms: 750,
            domain_allow: Vec::new(),
        }
    }
}

impl CrawlerConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Full User-Agent header value
    pub header: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            header: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Output configuration
///
/// Either sink, both, or neither may be configured.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path of the JSON-lines output file
    #[serde(rename = "jsonl-path")]
    pub jsonl_path: Option<String>,

    /// Path of the CSV output file
    #[serde(rename = "csv-path")]
    pub csv_path: Option<String>,
}
