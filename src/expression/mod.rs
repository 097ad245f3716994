//! Key expressions evaluated against record attributes.
//!
//! The deduplication core only sees a [`KeyExtractor`](crate::services::deduplication::KeyExtractor);
//! [`KeyExpression`] is the extractor the processor configures from `unique_key`.

mod key_expression;

pub use key_expression::KeyExpression;
