//! # Uniqflow
//!
//! Batch deduplication stage for record pipelines.
//!
//! Uniqflow pulls a bounded batch of records from an upstream queue, derives a
//! key for each record from its own attributes, and splits the batch into
//! three groups: records kept, duplicates removed, and records whose key could
//! not be derived.
//!
//! ## Features
//!
//! - Retain-first or retain-last policy per invocation
//! - `${attribute}` key expressions over arbitrary record attributes
//! - Single-pass classification with O(1) retraction under retain-last
//! - JSON, YAML and CSV record input and output
//!
//! ## Example
//!
//! ```rust
//! use uniqflow::models::{Record, RetentionPolicy};
//! use uniqflow::services::deduplication::classify;
//! use uniqflow::KeyExpression;
//!
//! let key = KeyExpression::parse("${custom_id}")?;
//! let batch = vec![
//!     Record::with_id("f0").with_attribute("custom_id", "1"),
//!     Record::with_id("f1").with_attribute("custom_id", "1"),
//!     Record::with_id("f2").with_attribute("custom_id", "2"),
//! ];
//!
//! let result = classify(batch, &key, RetentionPolicy::RetainLast);
//! let kept: Vec<&str> = result.kept.iter().map(|r| r.id.as_str()).collect();
//! assert_eq!(kept, ["f1", "f2"]);
//! # Ok::<(), uniqflow::Error>(())
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

// Module declarations
pub mod config;
pub mod expression;
pub mod io;
pub mod models;
pub mod observability;
pub mod queue;
pub mod services;

// Re-exports for convenience
pub use config::UniqflowConfig;
pub use expression::KeyExpression;
pub use models::{
    ClassificationResult, ClassificationSummary, Record, RecordId, RetentionPolicy, RunSummary,
};
pub use queue::{BatchSupplier, InMemoryQueue, MemorySink, RecordSink};
pub use services::UniqueProcessor;
pub use services::deduplication::{BatchDeduplicator, DeduplicationConfig, KeyExtractor};

/// Error type for uniqflow operations.
///
/// Uses `thiserror` for automatic `Display` and `Error` trait implementations.
/// Classification itself never fails: records without a usable key are routed
/// to the failure group instead.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidInput` | Blank or malformed key expressions, unknown formats, unparseable records |
/// | `OperationFailed` | File I/O, config parsing, serialization, logging setup |
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid input was provided.
    ///
    /// Raised when:
    /// - The unique key expression is empty or has an unterminated `${`
    /// - A record document cannot be parsed
    /// - A file format or log format name is unknown
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An operation failed.
    ///
    /// Raised when:
    /// - Filesystem I/O errors occur
    /// - The config file cannot be parsed
    /// - The tracing subscriber cannot be installed
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },
}

/// Result type alias for uniqflow operations.
pub type Result<T> = std::result::Result<T, Error>;
