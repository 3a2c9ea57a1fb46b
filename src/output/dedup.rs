//! Identity-key deduplication in front of the output sinks

use crate::output::traits::{OutputResult, RecordSink};
use crate::record::{IdentityKey, JobRecord};
use std::collections::HashSet;

/// Drops repeated postings and fans the first of each out to every sink
///
/// The key set only grows for the lifetime of the run.
pub struct Deduplicator {
    seen: HashSet<IdentityKey>,
    sinks: Vec<Box<dyn RecordSink>>,
    collected: u64,
    kept: u64,
}

impl Deduplicator {
    pub fn new(sinks: Vec<Box<dyn RecordSink>>) -> Self {
        Self {
            seen: HashSet::new(),
            sinks,
            collected: 0,
            kept: 0,
        }
    }

    /// Submits a record, returning whether it was kept
    ///
    /// A record whose identity key was already submitted is dropped
    /// silently. A kept record is written to every sink even if an earlier
    /// sink fails; the first sink error is returned.
    pub fn submit(&mut self, record: JobRecord) -> OutputResult<bool> {
        self.collected += 1;

        if !self.seen.insert(record.identity_key()) {
            tracing::trace!("Duplicate record dropped: {:?}", record.title);
            return Ok(false);
        }
        self.kept += 1;

        let mut first_error = None;
        for sink in &mut self.sinks {
            if let Err(e) = sink.write_record(&record) {
                tracing::error!("Failed to write record to {} sink: {}", sink.name(), e);
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(true),
        }
    }

    /// Records submitted so far, duplicates included
    pub fn collected(&self) -> u64 {
        self.collected
    }

    /// Records that survived deduplication
    pub fn kept(&self) -> u64 {
        self.kept
    }

    pub fn duplicates(&self) -> u64 {
        self.collected - self.kept
    }

    /// Flushes every sink, returning the first error
    pub fn finish(&mut self) -> OutputResult<()> {
        let mut first_error = None;
        for sink in &mut self.sinks {
            if let Err(e) = sink.finish() {
                tracing::error!("Failed to finish {} sink: {}", sink.name(), e);
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
