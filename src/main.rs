//! Jobsweep main entry point
//!
//! This is the command-line interface for the Jobsweep job-board harvester.

use clap::Parser;
use jobsweep::config::{load_config_with_hash, validate, Config};
use jobsweep::crawler::crawl;
use jobsweep::output::print_summary;
use jobsweep::sites::{resolve_sites, site_names};
use jobsweep::ConfigError;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Jobsweep: a polite job-board harvester
///
/// Jobsweep searches several job boards, follows listing pages to job
/// detail pages while respecting robots.txt and per-host delays, and
/// writes the deduplicated postings to JSON lines and/or CSV.
#[derive(Parser, Debug)]
#[command(name = "jobsweep")]
#[command(version = "1.0.0")]
#[command(about = "A polite job-board harvester", long_about = None)]
struct Cli {
    /// Path to an optional TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Sites to search, or "all" (comma separated or repeated)
    #[arg(long, num_args = 1.., value_delimiter = ',')]
    sites: Vec<String>,

    /// Search query, e.g. "nurse"
    #[arg(short, long)]
    query: Option<String>,

    /// Location filter, e.g. "Zurich"
    #[arg(short, long)]
    location: Option<String>,

    /// Maximum pages fetched per site
    #[arg(long)]
    max_pages: Option<u32>,

    /// Maximum concurrent requests across all sites
    #[arg(long)]
    concurrency: Option<u32>,

    /// Base politeness delay per host, in seconds
    #[arg(long)]
    delay: Option<f64>,

    /// Per-request timeout, in seconds
    #[arg(long)]
    timeout: Option<f64>,

    /// Attempts per URL before giving up
    #[arg(long)]
    max_retries: Option<u32>,

    /// User-Agent header sent with every request
    #[arg(long)]
    user_agent: Option<String>,

    /// Write JSON lines to this path
    #[arg(long, value_name = "PATH")]
    out_jsonl: Option<String>,

    /// Write CSV to this path
    #[arg(long, value_name = "PATH")]
    out_csv: Option<String>,

    /// Only crawl these hosts and their subdomains
    #[arg(long, num_args = 1.., value_delimiter = ',')]
    domain_allow: Vec<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and print the seed URLs without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            match load_config_with_hash(path) {
                Ok((config, hash)) => {
                    tracing::info!("Configuration loaded successfully (hash: {})", hash);
                    config
                }
                Err(e) => {
                    tracing::error!("Failed to load configuration: {}", e);
                    return Err(e.into());
                }
            }
        }
        None => Config::default(),
    };

    if let Err(e) = apply_overrides(&cli, &mut config).and_then(|()| validate(&config)) {
        tracing::error!("Invalid configuration: {}", e);
        if matches!(e, ConfigError::UnknownSite(_)) {
            tracing::error!("Known sites: {}, all", site_names().join(", "));
        }
        return Err(e.into());
    }

    if cli.dry_run {
        handle_dry_run(&config)?;
    } else {
        handle_crawl(config, cli.quiet).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("jobsweep=info,warn"),
            1 => EnvFilter::new("jobsweep=debug,info"),
            2 => EnvFilter::new("jobsweep=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Applies command-line flags on top of the file configuration
fn apply_overrides(cli: &Cli, config: &mut Config) -> Result<(), ConfigError> {
    if !cli.sites.is_empty() {
        config.search.sites = cli.sites.clone();
    }
    if let Some(query) = &cli.query {
        config.search.query = query.clone();
    }
    if let Some(location) = &cli.location {
        config.search.location = Some(location.clone());
    }

    if let Some(max_pages) = cli.max_pages {
        config.crawler.max_pages = max_pages;
    }
    if let Some(concurrency) = cli.concurrency {
        config.crawler.concurrency = concurrency;
    }
    if let Some(delay) = cli.delay {
        config.crawler.delay_ms = seconds_to_ms("delay", delay)?;
    }
    if let Some(timeout) = cli.timeout {
        config.crawler.timeout_ms = seconds_to_ms("timeout", timeout)?;
    }
    if let Some(max_retries) = cli.max_retries {
        config.crawler.max_retries = max_retries;
    }
    if !cli.domain_allow.is_empty() {
        config.crawler.domain_allow = cli.domain_allow.clone();
    }

    if let Some(user_agent) = &cli.user_agent {
        config.user_agent.header = user_agent.clone();
    }

    if let Some(path) = &cli.out_jsonl {
        config.output.jsonl_path = Some(path.clone());
    }
    if let Some(path) = &cli.out_csv {
        config.output.csv_path = Some(path.clone());
    }

    Ok(())
}

fn seconds_to_ms(flag: &str, seconds: f64) -> Result<u64, ConfigError> {
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(ConfigError::Validation(format!(
            "--{} must be a non-negative number of seconds, got {}",
            flag, seconds
        )));
    }
    Ok((seconds * 1000.0).round() as u64)
}

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Jobsweep Dry Run ===\n");

    println!("Search:");
    println!("  Query: {}", config.search.query);
    println!(
        "  Location: {}",
        config.search.location.as_deref().unwrap_or("(any)")
    );

    println!("\nCrawler Configuration:");
    println!("  Max pages per site: {}", config.crawler.max_pages);
    println!("  Concurrency: {}", config.crawler.concurrency);
    println!("  Delay: {}ms", config.crawler.delay_ms);
    println!("  Timeout: {}ms", config.crawler.timeout_ms);
    println!("  Max attempts: {}", config.crawler.max_retries);
    if !config.crawler.domain_allow.is_empty() {
        println!("  Allowed hosts: {}", config.crawler.domain_allow.join(", "));
    }

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header);

    println!("\nOutput:");
    println!(
        "  JSON lines: {}",
        config.output.jsonl_path.as_deref().unwrap_or("(none)")
    );
    println!(
        "  CSV: {}",
        config.output.csv_path.as_deref().unwrap_or("(none)")
    );

    let adapters = resolve_sites(&config.search.sites)?;
    let mut seed_count = 0;
    println!("\nSites ({}):", adapters.len());
    for adapter in &adapters {
        match adapter.build_seed_urls(&config.search.query, config.search.location.as_deref()) {
            Ok(seeds) => {
                println!("  - {}", adapter.id());
                for seed in &seeds {
                    println!("    * {}", seed);
                }
                seed_count += seeds.len();
            }
            Err(e) => println!("  - {} (skipped: {})", adapter.id(), e),
        }
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would start crawling with {} seed URLs", seed_count);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, quiet: bool) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        "Searching {} for \"{}\"",
        config.search.sites.join(", "),
        config.search.query
    );

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, finishing in-flight work and writing results");
            interrupt.cancel();
        }
    });

    match crawl(config, cancel).await {
        Ok(summary) => {
            if !quiet {
                print_summary(&summary);
            }
            match summary.output_error {
                Some(error) => {
                    tracing::error!("Output was not fully written: {}", error);
                    Err(error.into())
                }
                None => Ok(()),
            }
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
