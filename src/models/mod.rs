//! Data models for uniqflow.
//!
//! This module contains the records flowing through the stage and the
//! values describing how a batch was classified.

mod classification;
mod policy;
mod record;

pub use classification::{ClassificationResult, ClassificationSummary, RunSummary};
pub use policy::RetentionPolicy;
pub use record::{Record, RecordId, UUID_ATTRIBUTE};
