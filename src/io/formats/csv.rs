//! CSV format adapter for records.
//!
//! The header row names the attributes. The first `id` column also becomes
//! the record id and the first `content` column becomes the payload. Later
//! columns with either name are plain attributes. Tab-separated input uses
//! the same adapter with a different delimiter.

use crate::io::traits::{RecordSource, RecordWriter};
use crate::models::{Record, RecordId, UUID_ATTRIBUTE};
use crate::{Error, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::io::{BufRead, Write};

const ID_COLUMN: &str = "id";
const CONTENT_COLUMN: &str = "content";

/// Field delimiter for comma-separated files.
pub const COMMA: u8 = b',';
/// Field delimiter for tab-separated files.
pub const TAB: u8 = b'\t';

/// CSV record source.
pub struct CsvRecordSource<R: BufRead> {
    /// CSV reader.
    reader: csv::Reader<R>,
    /// Column names from the header row.
    headers: Vec<String>,
    /// Position of the column holding the record id.
    id_column: Option<usize>,
    /// Position of the column holding the payload.
    content_column: Option<usize>,
}

impl<R: BufRead> CsvRecordSource<R> {
    /// Creates a new comma-separated record source.
    ///
    /// # Errors
    ///
    /// Returns an error if the header row cannot be read or is empty.
    pub fn new(reader: R) -> Result<Self> {
        Self::with_delimiter(reader, COMMA)
    }

    /// Creates a record source splitting fields on `delimiter`.
    ///
    /// Header names are trimmed; cell values are kept as written.
    ///
    /// # Errors
    ///
    /// Returns an error if the header row cannot be read or is empty.
    pub fn with_delimiter(reader: R, delimiter: u8) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .delimiter(delimiter)
            .flexible(true) // Allow varying number of fields
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader
            .headers()
            .map_err(|e| Error::OperationFailed {
                operation: "read_csv_headers".to_string(),
                cause: e.to_string(),
            })?
            .iter()
            .map(String::from)
            .collect();

        if headers.iter().all(String::is_empty) {
            return Err(Error::InvalidInput(
                "CSV input must start with a header row".to_string(),
            ));
        }

        let id_column = headers.iter().position(|h| h == ID_COLUMN);
        let content_column = headers.iter().position(|h| h == CONTENT_COLUMN);

        Ok(Self {
            reader: csv_reader,
            headers,
            id_column,
            content_column,
        })
    }

    /// Builds a record from one row. Empty cells are treated as absent.
    ///
    /// The id cell is kept as an `id` attribute too, so keys may reference it.
    fn parse_row(&self, row: &csv::StringRecord) -> Record {
        let mut id = None;
        let mut content = None;
        let mut attributes = BTreeMap::new();

        for (index, (header, value)) in self.headers.iter().zip(row.iter()).enumerate() {
            if header.is_empty() || value.is_empty() {
                continue;
            }
            if Some(index) == self.content_column {
                content = Some(value.to_string());
                continue;
            }
            if Some(index) == self.id_column {
                id = Some(value.to_string());
            }
            attributes.insert(header.clone(), value.to_string());
        }

        let id = id
            .or_else(|| attributes.get(UUID_ATTRIBUTE).cloned())
            .map_or_else(RecordId::generate, RecordId::new);
        Record::from_parts(id, attributes, content)
    }
}

impl<R: BufRead> RecordSource for CsvRecordSource<R> {
    fn next_record(&mut self) -> Result<Option<Record>> {
        let mut row = csv::StringRecord::new();

        let has_row = self
            .reader
            .read_record(&mut row)
            .map_err(|e| Error::OperationFailed {
                operation: "read_csv".to_string(),
                cause: e.to_string(),
            })?;
        if !has_row {
            return Ok(None);
        }

        Ok(Some(self.parse_row(&row)))
    }
}

/// CSV record writer.
///
/// The header is the union of all attribute names, so records are buffered
/// and written on [`finalize`](RecordWriter::finalize). The leading `id` and
/// `content` columns hold the record id and payload; attributes with those
/// names get their own column after them, except an `id` attribute that only
/// mirrors the record id.
pub struct CsvRecordWriter<W: Write> {
    writer: csv::Writer<W>,
    /// Records waiting for the header to be known.
    pending: Vec<Record>,
}

impl<W: Write> CsvRecordWriter<W> {
    /// Creates a new comma-separated record writer.
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self::with_delimiter(writer, COMMA)
    }

    /// Creates a record writer separating fields with `delimiter`.
    #[must_use]
    pub fn with_delimiter(writer: W, delimiter: u8) -> Self {
        let csv_writer = csv::WriterBuilder::new()
            .has_headers(false) // We write headers manually
            .delimiter(delimiter)
            .from_writer(writer);

        Self {
            writer: csv_writer,
            pending: Vec::new(),
        }
    }

    fn write_row<I, S>(&mut self, row: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        self.writer
            .write_record(row)
            .map_err(|e| Error::OperationFailed {
                operation: "write_csv".to_string(),
                cause: e.to_string(),
            })
    }
}

impl<W: Write + Send> RecordWriter for CsvRecordWriter<W> {
    fn write(&mut self, record: &Record) -> Result<()> {
        self.pending.push(record.clone());
        Ok(())
    }

    fn count(&self) -> usize {
        self.pending.len()
    }

    fn finalize(mut self: Box<Self>) -> Result<()> {
        let records = std::mem::take(&mut self.pending);
        if !records.is_empty() {
            let mut columns: BTreeSet<&str> = records
                .iter()
                .flat_map(|r| r.attributes.keys().map(String::as_str))
                .collect();
            let id_differs = records
                .iter()
                .any(|r| r.attribute(ID_COLUMN).is_some_and(|v| v != r.id.as_str()));
            if !id_differs {
                columns.remove(ID_COLUMN);
            }
            // A `content` attribute column must not be read back as the payload.
            let with_content =
                columns.contains(CONTENT_COLUMN) || records.iter().any(|r| r.content.is_some());

            let mut header = vec![ID_COLUMN];
            if with_content {
                header.push(CONTENT_COLUMN);
            }
            header.extend(columns.iter().copied());
            self.write_row(&header)?;

            for record in &records {
                let mut row = vec![record.id.as_str()];
                if with_content {
                    row.push(record.content.as_deref().unwrap_or_default());
                }
                row.extend(
                    columns
                        .iter()
                        .map(|name| record.attribute(name).unwrap_or_default()),
                );
                self.write_row(&row)?;
            }
        }

        self.writer.flush().map_err(|e| Error::OperationFailed {
            operation: "flush_csv".to_string(),
            cause: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::KeyExpression;
    use crate::io::Format;
    use crate::models::RetentionPolicy;
    use crate::services::deduplication::classify;
    use std::io::Cursor;

    #[test]
    fn test_read_csv() {
        let input = "id,custom_id,custom_value\nf0,1,123\nf1,1,456\n,2,789\n";
        let mut source = CsvRecordSource::new(Cursor::new(input)).unwrap();

        let f0 = source.next_record().unwrap().unwrap();
        assert_eq!(f0.id.as_str(), "f0");
        assert_eq!(f0.attribute("custom_id"), Some("1"));
        assert_eq!(f0.attribute("custom_value"), Some("123"));
        assert_eq!(f0.attribute("id"), Some("f0"));

        let f1 = source.next_record().unwrap().unwrap();
        assert_eq!(f1.attribute("custom_value"), Some("456"));

        let generated = source.next_record().unwrap().unwrap();
        assert_eq!(generated.attribute("uuid"), Some(generated.id.as_str()));
        assert_eq!(generated.attribute("custom_id"), Some("2"));

        assert!(source.next_record().unwrap().is_none());
    }

    #[test]
    fn test_read_skips_empty_cells() {
        let input = "id,a,b\nr1,,x\nr2,y\n";
        let mut source = CsvRecordSource::new(Cursor::new(input)).unwrap();

        let r1 = source.next_record().unwrap().unwrap();
        assert_eq!(r1.attribute("a"), None);
        assert_eq!(r1.attribute("b"), Some("x"));

        let r2 = source.next_record().unwrap().unwrap();
        assert_eq!(r2.attribute("a"), Some("y"));
        assert_eq!(r2.attribute("b"), None);
    }

    #[test]
    fn test_read_content_column() {
        let input = "content,k\n\"hello, world\",1\n";
        let mut source = CsvRecordSource::new(Cursor::new(input)).unwrap();

        let record = source.next_record().unwrap().unwrap();
        assert_eq!(record.content.as_deref(), Some("hello, world"));
        assert_eq!(record.attribute("k"), Some("1"));
    }

    #[test]
    fn test_write_union_header() {
        let mut output = Vec::new();
        {
            let mut writer = CsvRecordWriter::new(&mut output);
            writer
                .write(&Record::with_id("a").with_attribute("x", "1"))
                .unwrap();
            writer
                .write(&Record::with_id("b").with_attribute("y", "2"))
                .unwrap();
            assert_eq!(writer.count(), 2);
            Box::new(writer).finalize().unwrap();
        }

        let text = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["id,uuid,x,y", "a,a,1,", "b,b,,2"]);
    }

    #[test]
    fn test_id_column_usable_as_key() {
        let records = crate::io::read_records("id,name\n7,a\n7,b\n8,c\n".as_bytes(), Format::Csv)
            .unwrap();
        let key = KeyExpression::parse("${id}").unwrap();

        let result = classify(records, &key, RetentionPolicy::RetainFirst);

        assert_eq!(result.summary().to_string(), "original: 3, kept: 2, removed: 1, errored: 0");
        assert_eq!(result.removed[0].attribute("name"), Some("b"));
    }

    #[test]
    fn test_cells_not_trimmed() {
        let input = " id , k \nr1, a\nr2,a\n";
        let mut source = CsvRecordSource::new(Cursor::new(input)).unwrap();

        let r1 = source.next_record().unwrap().unwrap();
        assert_eq!(r1.id.as_str(), "r1");
        assert_eq!(r1.attribute("k"), Some(" a"));
        let r2 = source.next_record().unwrap().unwrap();
        assert_eq!(r2.attribute("k"), Some("a"));
    }

    #[test]
    fn test_read_tab_separated() {
        let input = "custom_id\tcustom_value\n1\t123\n1\t4,56\n";
        let mut source = CsvRecordSource::with_delimiter(Cursor::new(input), TAB).unwrap();

        let first = source.next_record().unwrap().unwrap();
        assert_eq!(first.attribute("custom_id"), Some("1"));
        assert_eq!(first.attribute("custom_value"), Some("123"));
        let second = source.next_record().unwrap().unwrap();
        assert_eq!(second.attribute("custom_value"), Some("4,56"));
    }

    #[test]
    fn test_write_keeps_colliding_attributes() {
        let mut output = Vec::new();
        {
            let mut writer = CsvRecordWriter::new(&mut output);
            writer
                .write(
                    &Record::with_id("r1")
                        .with_attribute("id", "external-9")
                        .with_attribute("content", "summary"),
                )
                .unwrap();
            Box::new(writer).finalize().unwrap();
        }

        let text = String::from_utf8(output).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("id,content,content,id,uuid"));

        let back = crate::io::read_records(text.as_bytes(), Format::Csv).unwrap();
        assert_eq!(back[0].id.as_str(), "r1");
        assert_eq!(back[0].content, None);
        assert_eq!(back[0].attribute("id"), Some("external-9"));
        assert_eq!(back[0].attribute("content"), Some("summary"));
    }

    #[test]
    fn test_write_nothing() {
        let mut output = Vec::new();
        Box::new(CsvRecordWriter::new(&mut output))
            .finalize()
            .unwrap();
        assert!(output.is_empty());
    }
}
