//! Configuration module for Jobsweep
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use jobsweep::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("jobsweep.toml")).unwrap();
//! println!("Each site gets at most {} pages", config.crawler.max_pages);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, OutputConfig, SearchConfig, UserAgentConfig, DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
