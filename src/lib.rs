//! Jobsweep: a polite job-board harvester
//!
//! This crate implements a concurrent crawler that harvests job postings from
//! several job-board sites, respecting robots.txt and per-host politeness
//! delays, and writes deduplicated records to JSON-lines and CSV sinks.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod output;
pub mod record;
pub mod robots;
pub mod sites;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Jobsweep operations
#[derive(Debug, Error)]
pub enum JobsweepError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::SiteState,
        to: state::SiteState,
    },

    #[error("Record collector stopped unexpectedly: {0}")]
    Collector(String),
}

/// Configuration-specific errors
///
/// These are fatal to a run and are surfaced before any crawling starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unknown site: {0}")]
    UnknownSite(String),

    #[error("Invalid domain pattern: {0}")]
    InvalidPattern(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,

    #[error("Malformed URL: {0}")]
    Malformed(String),
}

/// Result type alias for Jobsweep operations
pub type Result<T> = std::result::Result<T, JobsweepError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::Crawler;
pub use record::{IdentityKey, JobRecord};
pub use sites::SiteAdapter;
pub use state::SiteState;
