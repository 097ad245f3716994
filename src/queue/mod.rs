//! Upstream batch supply and downstream routing.
//!
//! The processor pulls work through a [`BatchSupplier`] and routes the three
//! classification outcomes through a [`RecordSink`]:
//!
//! | Outcome | Sink method |
//! |---------|-------------|
//! | kept | [`RecordSink::transfer_success`] |
//! | errored | [`RecordSink::transfer_failure`] |
//! | removed | [`RecordSink::remove`] |

mod memory;

pub use memory::{InMemoryQueue, MemorySink};

use crate::Result;
use crate::models::Record;
use std::num::NonZeroUsize;

/// Source of record batches.
pub trait BatchSupplier {
    /// Takes up to `limit` records in queue order, or every queued record
    /// when `limit` is `None`.
    ///
    /// Records beyond the limit stay queued for a later call.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying queue cannot be read.
    fn take_batch(&mut self, limit: Option<NonZeroUsize>) -> Result<Vec<Record>>;

    /// Number of records still waiting.
    fn pending(&self) -> usize;
}

/// Destination for classified records.
pub trait RecordSink {
    /// Forwards records that survived deduplication.
    ///
    /// # Errors
    ///
    /// Returns an error if the records cannot be delivered.
    fn transfer_success(&mut self, records: Vec<Record>) -> Result<()>;

    /// Forwards records whose key could not be evaluated.
    ///
    /// # Errors
    ///
    /// Returns an error if the records cannot be delivered.
    fn transfer_failure(&mut self, records: Vec<Record>) -> Result<()>;

    /// Drops duplicate records from the pipeline.
    ///
    /// # Errors
    ///
    /// Returns an error if the removal cannot be recorded.
    fn remove(&mut self, records: Vec<Record>) -> Result<()>;
}

impl<S: BatchSupplier + ?Sized> BatchSupplier for &mut S {
    fn take_batch(&mut self, limit: Option<NonZeroUsize>) -> Result<Vec<Record>> {
        (**self).take_batch(limit)
    }

    fn pending(&self) -> usize {
        (**self).pending()
    }
}

impl<S: RecordSink + ?Sized> RecordSink for &mut S {
    fn transfer_success(&mut self, records: Vec<Record>) -> Result<()> {
        (**self).transfer_success(records)
    }

    fn transfer_failure(&mut self, records: Vec<Record>) -> Result<()> {
        (**self).transfer_failure(records)
    }

    fn remove(&mut self, records: Vec<Record>) -> Result<()> {
        (**self).remove(records)
    }
}
