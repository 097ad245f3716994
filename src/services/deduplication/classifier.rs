//! Single-pass batch classifier.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::models::{ClassificationResult, RetentionPolicy};

use super::types::{KeyExtractor, usable_key};

/// Partitions a batch into kept, removed and errored records.
///
/// # How it works
///
/// 1. Walks the batch once, in input order
/// 2. Records without a usable key go straight to `errored`
/// 3. The first record seen for a key is provisionally kept
/// 4. Later records with the same key are resolved by the [`RetentionPolicy`]:
///    - `RetainFirst`: the newcomer is removed
///    - `RetainLast`: the current survivor is retracted into `removed` and the
///      newcomer is appended to `kept`
///
/// Retraction is O(1): kept records live in slots, and the working map points
/// each key at the slot of its current survivor. Emptied slots are dropped
/// when the pass finishes.
///
/// Under `RetainLast`, `removed` is ordered by the time each record was
/// superseded, not by its original position.
///
/// The classifier holds no state between calls; concurrent calls on
/// different batches are independent.
///
/// # Example
///
/// ```rust
/// use uniqflow::models::RetentionPolicy;
/// use uniqflow::services::deduplication::BatchDeduplicator;
///
/// let batch = vec![("r0", "1"), ("r1", "1"), ("r2", "2")];
/// let key_of = |r: &(&str, &str)| Some(r.1.to_string());
///
/// let first = BatchDeduplicator::new(RetentionPolicy::RetainFirst).classify(batch.clone(), &key_of);
/// assert_eq!(first.kept, vec![("r0", "1"), ("r2", "2")]);
/// assert_eq!(first.removed, vec![("r1", "1")]);
///
/// let last = BatchDeduplicator::new(RetentionPolicy::RetainLast).classify(batch, &key_of);
/// assert_eq!(last.kept, vec![("r1", "1"), ("r2", "2")]);
/// assert_eq!(last.removed, vec![("r0", "1")]);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchDeduplicator {
    policy: RetentionPolicy,
}

impl BatchDeduplicator {
    /// Creates a classifier for the given policy.
    #[must_use]
    pub const fn new(policy: RetentionPolicy) -> Self {
        Self { policy }
    }

    /// Returns the retention policy.
    #[must_use]
    pub const fn policy(&self) -> RetentionPolicy {
        self.policy
    }

    /// Classifies one batch.
    ///
    /// Never fails: an empty batch yields three empty sequences, and records
    /// whose key is absent or blank are routed to `errored`.
    pub fn classify<R, I, K>(&self, batch: I, key_of: &K) -> ClassificationResult<R>
    where
        I: IntoIterator<Item = R>,
        K: KeyExtractor<R> + ?Sized,
    {
        let batch = batch.into_iter();
        let (capacity, _) = batch.size_hint();

        // key -> slot index of the current survivor
        let mut seen: HashMap<String, usize> = HashMap::with_capacity(capacity);
        let mut slots: Vec<Option<R>> = Vec::with_capacity(capacity);
        let mut removed = Vec::new();
        let mut errored = Vec::new();

        for record in batch {
            let Some(key) = usable_key(key_of.extract_key(&record)) else {
                errored.push(record);
                continue;
            };

            match seen.entry(key) {
                Entry::Vacant(entry) => {
                    entry.insert(slots.len());
                    slots.push(Some(record));
                },
                Entry::Occupied(mut entry) => match self.policy {
                    RetentionPolicy::RetainFirst => removed.push(record),
                    RetentionPolicy::RetainLast => {
                        if let Some(previous) = slots.get_mut(*entry.get()).and_then(Option::take)
                        {
                            removed.push(previous);
                        }
                        entry.insert(slots.len());
                        slots.push(Some(record));
                    },
                },
            }
        }

        ClassificationResult {
            kept: slots.into_iter().flatten().collect(),
            removed,
            errored,
        }
    }
}

/// Classifies `batch` with `key_of` under `policy`.
///
/// Shorthand for `BatchDeduplicator::new(policy).classify(batch, key_of)`.
pub fn classify<R, I, K>(batch: I, key_of: &K, policy: RetentionPolicy) -> ClassificationResult<R>
where
    I: IntoIterator<Item = R>,
    K: KeyExtractor<R> + ?Sized,
{
    BatchDeduplicator::new(policy).classify(batch, key_of)
}
