//! CSV sink
//!
//! The header row is the tabular schema; the opaque `raw` block is left out.
//! The header is written as soon as the sink is opened, so a run that keeps
//! no records still produces a valid file.

use crate::output::traits::{OutputResult, RecordSink};
use crate::record::{JobRecord, TABULAR_COLUMNS};
use std::fs::File;
use std::io::Write;
use std::path::Path;

pub struct CsvSink<W: Write + Send> {
    writer: csv::Writer<W>,
}

impl CsvSink<File> {
    /// Creates (or truncates) the file at `path` and writes the header
    pub fn create(path: &Path) -> OutputResult<Self> {
        Self::new(File::create(path)?)
    }
}

impl<W: Write + Send> CsvSink<W> {
    pub fn new(writer: W) -> OutputResult<Self> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(TABULAR_COLUMNS)?;
        Ok(Self { writer })
    }

    /// Flushes and returns the underlying writer
    pub fn into_inner(self) -> OutputResult<W> {
        self.writer
            .into_inner()
            .map_err(|e| crate::output::OutputError::Io(e.into_error()))
    }
}

impl<W: Write + Send> RecordSink for CsvSink<W> {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn write_record(&mut self, record: &JobRecord) -> OutputResult<()> {
        self.writer.write_record(record.tabular_row())?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        self.writer.flush()?;
        Ok(())
    }
}
