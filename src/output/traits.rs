//! Output sink traits and types
//!
//! This module defines the trait interface for record sinks and the errors
//! they report.

use crate::record::JobRecord;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// A destination for kept records
///
/// Sinks are owned by the record collector and written from one task, so
/// methods take `&mut self`.
pub trait RecordSink: Send {
    /// Short name used in log messages
    fn name(&self) -> &'static str;

    /// Appends one record
    fn write_record(&mut self, record: &JobRecord) -> OutputResult<()>;

    /// Flushes anything buffered; called once at the end of the run
    fn finish(&mut self) -> OutputResult<()>;
}
