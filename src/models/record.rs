//! Record types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Name of the core attribute every record carries its id under.
pub const UUID_ATTRIBUTE: &str = "uuid";

/// Unique identifier for a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Creates a new record ID from a string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh random (v4) record ID.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A unit of data flowing through the pipeline.
///
/// A record is an opaque payload plus a set of named string attributes.
/// Deduplication keys are derived from the attributes only; the payload is
/// carried through untouched.
///
/// The record's id is also visible as the `uuid` attribute, unless the
/// attribute map already supplies one.
///
/// # Example
///
/// ```rust
/// use uniqflow::models::Record;
///
/// let record = Record::new()
///     .with_attribute("custom_id", "1")
///     .with_attribute("custom_value", "123");
///
/// assert_eq!(record.attribute("custom_id"), Some("1"));
/// assert_eq!(record.attribute("uuid"), Some(record.id.as_str()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Identity of the record.
    pub id: RecordId,
    /// Named string attributes.
    pub attributes: BTreeMap<String, String>,
    /// Optional opaque payload.
    pub content: Option<String>,
}

impl Record {
    /// Creates an empty record with a generated id.
    #[must_use]
    pub fn new() -> Self {
        Self::with_id(RecordId::generate())
    }

    /// Creates an empty record with the given id.
    #[must_use]
    pub fn with_id(id: impl Into<RecordId>) -> Self {
        let id = id.into();
        let mut attributes = BTreeMap::new();
        attributes.insert(UUID_ATTRIBUTE.to_string(), id.as_str().to_string());
        Self {
            id,
            attributes,
            content: None,
        }
    }

    /// Builds a record from an id and an attribute map.
    ///
    /// The `uuid` attribute is only filled in when the map lacks one.
    #[must_use]
    pub fn from_parts(
        id: RecordId,
        mut attributes: BTreeMap<String, String>,
        content: Option<String>,
    ) -> Self {
        attributes
            .entry(UUID_ATTRIBUTE.to_string())
            .or_insert_with(|| id.as_str().to_string());
        Self {
            id,
            attributes,
            content,
        }
    }

    /// Sets an attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Sets several attributes at once.
    #[must_use]
    pub fn with_attributes<I, K, V>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.attributes
            .extend(attributes.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Sets the payload.
    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Returns the value of an attribute, if present.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

impl Default for Record {
    fn default() -> Self {
        Self::new()
    }
}
