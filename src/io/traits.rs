//! Core traits for reading and writing records.
//!
//! Defines the [`RecordSource`] and [`RecordWriter`] traits that format
//! adapters implement, plus the [`RecordDocument`] wire shape shared by the
//! structured formats.

use crate::Result;
use crate::models::{Record, RecordId, UUID_ATTRIBUTE};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Serialized form of a record.
///
/// # Field Mapping
///
/// | Field | Required | Default |
/// |-------|----------|---------|
/// | `id` | No | `uuid` attribute, else a fresh v4 UUID |
/// | `attributes` | No | `{}` |
/// | `content` | No | `None` |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordDocument {
    /// Record identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Named string attributes.
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,

    /// Opaque payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl RecordDocument {
    /// Converts the document into a record.
    ///
    /// Without an explicit `id`, an upstream `uuid` attribute is reused as
    /// the id; otherwise a new one is generated.
    #[must_use]
    pub fn into_record(self) -> Record {
        let id = self
            .id
            .filter(|id| !id.trim().is_empty())
            .or_else(|| self.attributes.get(UUID_ATTRIBUTE).cloned())
            .map_or_else(RecordId::generate, RecordId::new);
        Record::from_parts(id, self.attributes, self.content)
    }
}

impl From<&Record> for RecordDocument {
    fn from(record: &Record) -> Self {
        Self {
            id: Some(record.id.to_string()),
            attributes: record.attributes.clone(),
            content: record.content.clone(),
        }
    }
}

impl From<Record> for RecordDocument {
    fn from(record: Record) -> Self {
        Self {
            id: Some(record.id.to_string()),
            attributes: record.attributes,
            content: record.content,
        }
    }
}

/// Source of records.
///
/// Implementations read records from a specific format (JSON, YAML, CSV)
/// and yield them one at a time, in file order.
pub trait RecordSource {
    /// Reads the next record from the source.
    ///
    /// Returns `Ok(None)` when the source is exhausted.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails or I/O errors occur.
    fn next_record(&mut self) -> Result<Option<Record>>;

    /// Returns the number of records still to be read, if known.
    fn size_hint(&self) -> Option<usize> {
        None
    }
}

/// Writer for routed records.
///
/// # Lifecycle
///
/// 1. Create the writer with an output destination
/// 2. Call `write()` for each record
/// 3. Call `finalize()` to flush
pub trait RecordWriter: Send {
    /// Writes a single record.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or I/O fails.
    fn write(&mut self, record: &Record) -> Result<()>;

    /// Number of records written so far.
    fn count(&self) -> usize;

    /// Finalizes the output, writing any buffered data.
    ///
    /// # Errors
    ///
    /// Returns an error if I/O fails.
    fn finalize(self: Box<Self>) -> Result<()>;
}
