//! Batch processor that deduplicates queued records.
//!
//! Wires a [`BatchSupplier`], the configured [`KeyExpression`] and a
//! [`BatchDeduplicator`] together, then routes the outcome to a [`RecordSink`].

use crate::Result;
use crate::expression::KeyExpression;
use crate::models::{ClassificationSummary, RetentionPolicy, RunSummary};
use crate::queue::{BatchSupplier, RecordSink};
use crate::services::deduplication::{BatchDeduplicator, DeduplicationConfig};
use std::num::NonZeroUsize;
use std::time::Instant;
use tracing::instrument;

/// Deduplicates one queued batch per trigger.
///
/// # Example
///
/// ```rust
/// use uniqflow::models::Record;
/// use uniqflow::queue::{InMemoryQueue, MemorySink};
/// use uniqflow::services::UniqueProcessor;
/// use uniqflow::services::deduplication::DeduplicationConfig;
///
/// let processor = UniqueProcessor::new(
///     DeduplicationConfig::default().with_unique_key("${custom_id}"),
/// )?;
///
/// let mut queue: InMemoryQueue = ["1", "1", "2"]
///     .into_iter()
///     .map(|id| Record::new().with_attribute("custom_id", id))
///     .collect();
/// let mut sink = MemorySink::new();
///
/// let summary = processor.on_trigger(&mut queue, &mut sink)?.expect("non-empty batch");
/// assert_eq!(summary.kept, 2);
/// assert_eq!(sink.removed.len(), 1);
/// # Ok::<(), uniqflow::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct UniqueProcessor {
    key: KeyExpression,
    deduplicator: BatchDeduplicator,
    batch_limit: Option<NonZeroUsize>,
}

impl UniqueProcessor {
    /// Creates a processor from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`](crate::Error::InvalidInput) if the
    /// unique key expression is blank or malformed.
    pub fn new(config: DeduplicationConfig) -> Result<Self> {
        let key = config.validate()?;
        Ok(Self {
            key,
            deduplicator: BatchDeduplicator::new(config.policy()),
            batch_limit: config.batch_limit(),
        })
    }

    /// Returns the key expression in use.
    #[must_use]
    pub const fn key(&self) -> &KeyExpression {
        &self.key
    }

    /// Returns the retention policy in use.
    #[must_use]
    pub const fn policy(&self) -> RetentionPolicy {
        self.deduplicator.policy()
    }

    /// Returns the per-trigger batch limit, `None` meaning unbounded.
    #[must_use]
    pub const fn batch_limit(&self) -> Option<NonZeroUsize> {
        self.batch_limit
    }

    /// Processes one batch.
    ///
    /// Returns `Ok(None)` without touching the sink when nothing is queued.
    ///
    /// # Errors
    ///
    /// Returns an error if the supplier or the sink fails.
    #[instrument(
        skip(self, supplier, sink),
        fields(operation = "unique", policy = %self.policy())
    )]
    pub fn on_trigger<S, K>(
        &self,
        supplier: &mut S,
        sink: &mut K,
    ) -> Result<Option<ClassificationSummary>>
    where
        S: BatchSupplier + ?Sized,
        K: RecordSink + ?Sized,
    {
        let batch = supplier.take_batch(self.batch_limit)?;
        if batch.is_empty() {
            return Ok(None);
        }

        let start = Instant::now();
        let result = self.deduplicator.classify(batch, &self.key);
        let summary = result.summary();
        let duration_ms = start.elapsed().as_secs_f64() * 1000.0;

        tracing::info!(
            original = summary.original,
            kept = summary.kept,
            removed = summary.removed,
            errored = summary.errored,
            "Deduplicated batch"
        );
        record_metrics(&summary, duration_ms);

        let (kept, removed, errored) = result.into_parts();
        sink.transfer_success(kept)?;
        sink.transfer_failure(errored)?;
        sink.remove(removed)?;

        Ok(Some(summary))
    }

    /// Triggers repeatedly until the supplier has nothing left.
    ///
    /// Each batch is deduplicated independently; no key state is carried
    /// from one batch to the next.
    ///
    /// # Errors
    ///
    /// Returns the first supplier or sink error.
    pub fn run_until_drained<S, K>(&self, supplier: &mut S, sink: &mut K) -> Result<RunSummary>
    where
        S: BatchSupplier + ?Sized,
        K: RecordSink + ?Sized,
    {
        let mut run = RunSummary::default();
        while let Some(summary) = self.on_trigger(supplier, sink)? {
            run.absorb(&summary);
        }
        tracing::debug!(batches = run.batches, original = run.original, "Queue drained");
        Ok(run)
    }
}

fn record_metrics(summary: &ClassificationSummary, duration_ms: f64) {
    for (outcome, count) in [
        ("kept", summary.kept),
        ("removed", summary.removed),
        ("errored", summary.errored),
    ] {
        metrics::counter!("uniqflow_records_total", "outcome" => outcome).increment(count as u64);
    }
    metrics::counter!("uniqflow_batches_total").increment(1);
    metrics::histogram!("uniqflow_classify_duration_ms").record(duration_ms);
}
