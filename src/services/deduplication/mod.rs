//! Batch deduplication.
//!
//! This module partitions one batch of records into three disjoint groups:
//! 1. **Kept**: one survivor per key, chosen by the [`RetentionPolicy`](crate::models::RetentionPolicy)
//! 2. **Removed**: duplicates that lost to the survivor
//! 3. **Errored**: records whose key is absent or blank
//!
//! Every batch is classified independently; nothing is remembered between calls.
//!
//! # Architecture
//!
//! ```text
//! batch ──► KeyExtractor ──► key ──┬── absent/blank ──► errored
//!                                  │
//!                                  ├── unseen ────────► kept
//!                                  │
//!                                  └── seen ──► RetainFirst: newcomer ──► removed
//!                                               RetainLast:  survivor ──► removed
//!                                                            newcomer ──► kept
//! ```
//!
//! # Example
//!
//! ```rust
//! use uniqflow::expression::KeyExpression;
//! use uniqflow::models::{Record, RetentionPolicy};
//! use uniqflow::services::deduplication::BatchDeduplicator;
//!
//! let key = KeyExpression::parse("${custom_id}")?;
//! let batch = vec![
//!     Record::new().with_attribute("custom_id", "1"),
//!     Record::new().with_attribute("custom_id", "1"),
//!     Record::new(),
//! ];
//!
//! let result = BatchDeduplicator::new(RetentionPolicy::RetainFirst).classify(batch, &key);
//! assert_eq!(result.kept.len(), 1);
//! assert_eq!(result.removed.len(), 1);
//! assert_eq!(result.errored.len(), 1);
//! # Ok::<(), uniqflow::Error>(())
//! ```

mod classifier;
mod config;
mod types;

pub use classifier::{BatchDeduplicator, classify};
pub use config::{DEFAULT_UNIQUE_KEY, DeduplicationConfig};
pub use types::{KeyExtractor, usable_key};
