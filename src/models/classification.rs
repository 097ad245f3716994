//! Classification result types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of classifying one batch.
///
/// Every input record lands in exactly one of the three sequences.
/// `kept` holds at most one record per distinct key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationResult<R> {
    /// Surviving records, one per key.
    pub kept: Vec<R>,
    /// Duplicates discarded by the retention policy.
    pub removed: Vec<R>,
    /// Records whose key could not be derived.
    pub errored: Vec<R>,
}

impl<R> ClassificationResult<R> {
    /// Total number of classified records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.kept.len() + self.removed.len() + self.errored.len()
    }

    /// Returns true if no records were classified.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Counts for logging and reporting.
    #[must_use]
    pub fn summary(&self) -> ClassificationSummary {
        ClassificationSummary {
            original: self.len(),
            kept: self.kept.len(),
            removed: self.removed.len(),
            errored: self.errored.len(),
        }
    }

    /// Splits the result into `(kept, removed, errored)`.
    #[must_use]
    pub fn into_parts(self) -> (Vec<R>, Vec<R>, Vec<R>) {
        (self.kept, self.removed, self.errored)
    }
}

impl<R> Default for ClassificationResult<R> {
    fn default() -> Self {
        Self {
            kept: Vec::new(),
            removed: Vec::new(),
            errored: Vec::new(),
        }
    }
}

/// Per-batch counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationSummary {
    /// Size of the batch.
    pub original: usize,
    /// Records routed to success.
    pub kept: usize,
    /// Duplicates dropped.
    pub removed: usize,
    /// Records routed to failure.
    pub errored: usize,
}

impl ClassificationSummary {
    /// Returns true if the counts cover the batch exactly.
    #[must_use]
    pub const fn is_consistent(&self) -> bool {
        self.kept + self.removed + self.errored == self.original
    }
}

impl fmt::Display for ClassificationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "original: {}, kept: {}, removed: {}, errored: {}",
            self.original, self.kept, self.removed, self.errored
        )
    }
}

/// Totals across several batches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Number of non-empty batches processed.
    pub batches: usize,
    /// Records pulled from the supplier.
    pub original: usize,
    /// Records routed to success.
    pub kept: usize,
    /// Duplicates dropped.
    pub removed: usize,
    /// Records routed to failure.
    pub errored: usize,
}

impl RunSummary {
    /// Folds one batch into the totals.
    pub const fn absorb(&mut self, batch: &ClassificationSummary) {
        self.batches += 1;
        self.original += batch.original;
        self.kept += batch.kept;
        self.removed += batch.removed;
        self.errored += batch.errored;
    }
}
