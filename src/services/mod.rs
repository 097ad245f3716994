//! Business logic services.
//!
//! [`deduplication`] holds the batch classification core; [`UniqueProcessor`]
//! drives it against a queue and a sink.

pub mod deduplication;
mod processor;

pub use processor::UniqueProcessor;
