//! Output module for kept records and run summaries
//!
//! This module handles:
//! - Deduplicating records by identity key
//! - Writing JSON-lines and CSV sinks
//! - Summarizing what a run did

mod csv_output;
mod dedup;
mod jsonl;
pub mod stats;
mod traits;

pub use csv_output::CsvSink;
pub use dedup::Deduplicator;
pub use jsonl::JsonLinesSink;
pub use stats::{print_summary, RunSummary, SiteReport};
pub use traits::{OutputError, OutputResult, RecordSink};

use crate::config::OutputConfig;
use std::path::Path;

/// Opens every sink the configuration names
///
/// Either, both, or neither sink may be configured. Files are created (or
/// truncated) up front so an unwritable path fails the run before crawling.
pub fn open_sinks(config: &OutputConfig) -> OutputResult<Vec<Box<dyn RecordSink>>> {
    let mut sinks: Vec<Box<dyn RecordSink>> = Vec::new();

    if let Some(path) = &config.jsonl_path {
        tracing::info!("Writing JSON lines to {}", path);
        sinks.push(Box::new(JsonLinesSink::create(Path::new(path))?));
    }

    if let Some(path) = &config.csv_path {
        tracing::info!("Writing CSV to {}", path);
        sinks.push(Box::new(CsvSink::create(Path::new(path))?));
    }

    Ok(sinks)
}
