//! In-memory queue and sink.

use super::{BatchSupplier, RecordSink};
use crate::Result;
use crate::models::Record;
use std::collections::VecDeque;
use std::num::NonZeroUsize;

/// FIFO queue of records held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryQueue {
    records: VecDeque<Record>,
}

impl InMemoryQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record to the back of the queue.
    pub fn enqueue(&mut self, record: Record) {
        self.records.push_back(record);
    }

    /// Returns the number of queued records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<Record> for InMemoryQueue {
    fn from_iter<T: IntoIterator<Item = Record>>(iter: T) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl Extend<Record> for InMemoryQueue {
    fn extend<T: IntoIterator<Item = Record>>(&mut self, iter: T) {
        self.records.extend(iter);
    }
}

impl BatchSupplier for InMemoryQueue {
    fn take_batch(&mut self, limit: Option<NonZeroUsize>) -> Result<Vec<Record>> {
        let count = limit.map_or(self.records.len(), |n| n.get().min(self.records.len()));
        Ok(self.records.drain(..count).collect())
    }

    fn pending(&self) -> usize {
        self.records.len()
    }
}

/// Sink that collects routed records in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    /// Records routed to success.
    pub success: Vec<Record>,
    /// Records routed to failure.
    pub failure: Vec<Record>,
    /// Records removed as duplicates.
    pub removed: Vec<Record>,
}

impl MemorySink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of records received across all routes.
    #[must_use]
    pub fn total(&self) -> usize {
        self.success.len() + self.failure.len() + self.removed.len()
    }
}

impl RecordSink for MemorySink {
    fn transfer_success(&mut self, records: Vec<Record>) -> Result<()> {
        self.success.extend(records);
        Ok(())
    }

    fn transfer_failure(&mut self, records: Vec<Record>) -> Result<()> {
        self.failure.extend(records);
        Ok(())
    }

    fn remove(&mut self, records: Vec<Record>) -> Result<()> {
        self.removed.extend(records);
        Ok(())
    }
}
