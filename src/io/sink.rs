//! File-backed routing sink.

use super::traits::RecordWriter;
use crate::Result;
use crate::models::Record;
use crate::queue::RecordSink;

/// Number of records a [`FileSink`] wrote per route.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileSinkCounts {
    /// Records written to the success output.
    pub success: usize,
    /// Records written to the failure output.
    pub failure: usize,
    /// Records written to the removed output.
    pub removed: usize,
}

/// Routes records to format writers.
///
/// Success records always have a destination. Failure and removed records are
/// written only when a writer is attached; otherwise they are dropped.
pub struct FileSink {
    success: Box<dyn RecordWriter>,
    failure: Option<Box<dyn RecordWriter>>,
    removed: Option<Box<dyn RecordWriter>>,
    dropped: usize,
}

impl FileSink {
    /// Creates a sink that writes success records to `success`.
    #[must_use]
    pub fn new(success: Box<dyn RecordWriter>) -> Self {
        Self {
            success,
            failure: None,
            removed: None,
            dropped: 0,
        }
    }

    /// Attaches a writer for failed records.
    #[must_use]
    pub fn with_failure(mut self, writer: Box<dyn RecordWriter>) -> Self {
        self.failure = Some(writer);
        self
    }

    /// Attaches a writer for removed duplicates.
    #[must_use]
    pub fn with_removed(mut self, writer: Box<dyn RecordWriter>) -> Self {
        self.removed = Some(writer);
        self
    }

    /// Flushes all writers and returns what was written.
    ///
    /// # Errors
    ///
    /// Returns an error if any writer fails to finalize.
    pub fn finish(self) -> Result<FileSinkCounts> {
        let counts = FileSinkCounts {
            success: self.success.count(),
            failure: self.failure.as_ref().map_or(0, |w| w.count()),
            removed: self.removed.as_ref().map_or(0, |w| w.count()),
        };
        if self.dropped > 0 {
            tracing::debug!(dropped = self.dropped, "Records without an output were dropped");
        }

        self.success.finalize()?;
        if let Some(writer) = self.failure {
            writer.finalize()?;
        }
        if let Some(writer) = self.removed {
            writer.finalize()?;
        }
        Ok(counts)
    }

    fn write_all(writer: &mut dyn RecordWriter, records: &[Record]) -> Result<()> {
        records.iter().try_for_each(|record| writer.write(record))
    }
}

impl RecordSink for FileSink {
    fn transfer_success(&mut self, records: Vec<Record>) -> Result<()> {
        Self::write_all(self.success.as_mut(), &records)
    }

    fn transfer_failure(&mut self, records: Vec<Record>) -> Result<()> {
        match self.failure.as_deref_mut() {
            Some(writer) => Self::write_all(writer, &records),
            None => {
                self.dropped += records.len();
                Ok(())
            },
        }
    }

    fn remove(&mut self, records: Vec<Record>) -> Result<()> {
        match self.removed.as_deref_mut() {
            Some(writer) => Self::write_all(writer, &records),
            None => {
                self.dropped += records.len();
                Ok(())
            },
        }
    }
}
