//! YAML format adapter for records.
//!
//! Supports YAML sequences and document streams (documents separated by `---`).

use crate::io::traits::{RecordDocument, RecordSource, RecordWriter};
use crate::models::Record;
use crate::{Error, Result};
use std::collections::VecDeque;
use std::io::{BufRead, Write};

/// YAML record source.
///
/// Parses all documents upfront since YAML requires full parsing.
pub struct YamlRecordSource {
    documents: VecDeque<RecordDocument>,
}

impl YamlRecordSource {
    /// Creates a new YAML record source.
    ///
    /// # Errors
    ///
    /// Returns an error if YAML parsing fails.
    pub fn new<R: BufRead>(mut reader: R) -> Result<Self> {
        let mut content = String::new();
        reader
            .read_to_string(&mut content)
            .map_err(|e| Error::OperationFailed {
                operation: "read_yaml".to_string(),
                cause: e.to_string(),
            })?;

        if content.trim().is_empty() {
            return Ok(Self {
                documents: VecDeque::new(),
            });
        }

        // Try parsing as a sequence first
        if let Ok(documents) = serde_yaml_ng::from_str::<Vec<RecordDocument>>(&content) {
            return Ok(Self {
                documents: documents.into(),
            });
        }

        let mut documents = VecDeque::new();
        for (doc_index, document) in serde_yaml_ng::Deserializer::from_str(&content).enumerate() {
            let document: RecordDocument =
                serde::Deserialize::deserialize(document).map_err(|e| {
                    Error::InvalidInput(format!(
                        "Document {}: Failed to parse YAML: {e}",
                        doc_index + 1
                    ))
                })?;
            documents.push_back(document);
        }

        Ok(Self { documents })
    }
}

impl RecordSource for YamlRecordSource {
    fn next_record(&mut self) -> Result<Option<Record>> {
        Ok(self
            .documents
            .pop_front()
            .map(RecordDocument::into_record))
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.documents.len())
    }
}

/// YAML record writer.
///
/// Writes records as a YAML document stream with `---` separators.
pub struct YamlRecordWriter<W: Write> {
    writer: W,
    /// Number of records written.
    count: usize,
}

impl<W: Write> YamlRecordWriter<W> {
    /// Creates a new YAML record writer.
    #[must_use]
    pub const fn new(writer: W) -> Self {
        Self { writer, count: 0 }
    }
}

impl<W: Write + Send> RecordWriter for YamlRecordWriter<W> {
    fn write(&mut self, record: &Record) -> Result<()> {
        if self.count > 0 {
            writeln!(self.writer, "---").map_err(|e| Error::OperationFailed {
                operation: "write_yaml".to_string(),
                cause: e.to_string(),
            })?;
        }

        serde_yaml_ng::to_writer(&mut self.writer, &RecordDocument::from(record)).map_err(
            |e| Error::OperationFailed {
                operation: "write_yaml".to_string(),
                cause: e.to_string(),
            },
        )?;
        self.count += 1;
        Ok(())
    }

    fn count(&self) -> usize {
        self.count
    }

    fn finalize(mut self: Box<Self>) -> Result<()> {
        self.writer.flush().map_err(|e| Error::OperationFailed {
            operation: "flush_yaml".to_string(),
            cause: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_multi_document() {
        let input = r"---
id: f0
attributes:
  custom_id: '1'
---
id: f1
attributes:
  custom_id: '2'
content: payload
";
        let mut source = YamlRecordSource::new(Cursor::new(input)).unwrap();
        assert_eq!(source.size_hint(), Some(2));

        let first = source.next_record().unwrap().unwrap();
        assert_eq!(first.id.as_str(), "f0");
        assert_eq!(first.attribute("custom_id"), Some("1"));

        let second = source.next_record().unwrap().unwrap();
        assert_eq!(second.content.as_deref(), Some("payload"));

        assert!(source.next_record().unwrap().is_none());
    }

    #[test]
    fn test_read_sequence() {
        let input = r"
- id: a
  attributes:
    k: x
- attributes:
    k: y
";
        let mut source = YamlRecordSource::new(Cursor::new(input)).unwrap();

        assert_eq!(source.next_record().unwrap().unwrap().id.as_str(), "a");
        let second = source.next_record().unwrap().unwrap();
        assert_eq!(second.attribute("k"), Some("y"));
        assert!(source.next_record().unwrap().is_none());
    }

    #[test]
    fn test_read_empty() {
        let mut source = YamlRecordSource::new(Cursor::new("  \n")).unwrap();
        assert!(source.next_record().unwrap().is_none());
    }

    #[test]
    fn test_write_stream() {
        let mut output = Vec::new();
        {
            let mut writer = YamlRecordWriter::new(&mut output);
            writer
                .write(&Record::with_id("a").with_attribute("k", "1"))
                .unwrap();
            writer.write(&Record::with_id("b")).unwrap();
            Box::new(writer).finalize().unwrap();
        }

        let text = String::from_utf8(output).unwrap();
        assert_eq!(text.matches("---").count(), 1);
        assert!(text.contains("id: a"));
        assert!(text.contains("id: b"));

        let mut source = YamlRecordSource::new(Cursor::new(text)).unwrap();
        assert_eq!(source.next_record().unwrap().unwrap().attribute("k"), Some("1"));
    }
}
