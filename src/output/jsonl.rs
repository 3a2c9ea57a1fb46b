//! JSON-lines sink
//!
//! One record per line, in the full record schema including `raw`.

use crate::output::traits::{OutputResult, RecordSink};
use crate::record::JobRecord;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub struct JsonLinesSink<W: Write + Send> {
    writer: BufWriter<W>,
}

impl JsonLinesSink<File> {
    /// Creates (or truncates) the file at `path`
    pub fn create(path: &Path) -> OutputResult<Self> {
        Ok(Self::new(File::create(path)?))
    }
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
        }
    }

    /// Flushes and returns the underlying writer
    pub fn into_inner(self) -> OutputResult<W> {
        self.writer
            .into_inner()
            .map_err(|e| crate::output::OutputError::Io(e.into_error()))
    }
}

impl<W: Write + Send> RecordSink for JsonLinesSink<W> {
    fn name(&self) -> &'static str {
        "jsonl"
    }

    fn write_record(&mut self, record: &JobRecord) -> OutputResult<()> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        self.writer.flush()?;
        Ok(())
    }
}
