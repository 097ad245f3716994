//! JSON format adapter for records.
//!
//! Supports both newline-delimited JSON (NDJSON/JSONL) and JSON arrays.

use crate::io::traits::{RecordDocument, RecordSource, RecordWriter};
use crate::models::Record;
use crate::{Error, Result};
use std::collections::VecDeque;
use std::io::{BufRead, Write};

/// JSON record source.
///
/// Automatically detects and handles both formats:
/// - **NDJSON/JSONL**: One JSON object per line
/// - **Array**: A JSON array of objects `[{...}, {...}]`
pub struct JsonRecordSource<R: BufRead> {
    reader: R,
    /// Documents parsed ahead of being returned.
    buffer: VecDeque<RecordDocument>,
    /// Whether we've detected and started parsing.
    started: bool,
    /// Whether we're in array mode.
    array_mode: bool,
    /// Line number for error reporting.
    line_number: usize,
}

impl<R: BufRead> JsonRecordSource<R> {
    /// Creates a new JSON record source.
    #[must_use]
    pub const fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: VecDeque::new(),
            started: false,
            array_mode: false,
            line_number: 0,
        }
    }

    /// Reads the next non-blank line, returning `false` at end of input.
    fn read_non_blank_line(&mut self, line: &mut String) -> Result<bool> {
        loop {
            line.clear();
            let bytes_read = self
                .reader
                .read_line(line)
                .map_err(|e| Error::OperationFailed {
                    operation: "read_json".to_string(),
                    cause: e.to_string(),
                })?;
            if bytes_read == 0 {
                return Ok(false);
            }
            self.line_number += 1;
            if !line.trim().is_empty() {
                return Ok(true);
            }
        }
    }

    /// Peeks at the first non-blank line to detect format.
    fn detect_format(&mut self) -> Result<bool> {
        self.started = true;

        let mut first_line = String::new();
        if !self.read_non_blank_line(&mut first_line)? {
            return Ok(false);
        }

        let trimmed = first_line.trim();
        if trimmed.starts_with('[') {
            self.array_mode = true;
            let mut remaining = String::new();
            self.reader
                .read_to_string(&mut remaining)
                .map_err(|e| Error::OperationFailed {
                    operation: "read_json".to_string(),
                    cause: e.to_string(),
                })?;
            let full_content = format!("{first_line}{remaining}");

            self.buffer = serde_json::from_str(&full_content)
                .map_err(|e| Error::InvalidInput(format!("Failed to parse JSON array: {e}")))?;
        } else {
            let document: RecordDocument = serde_json::from_str(trimmed).map_err(|e| {
                Error::InvalidInput(format!(
                    "Line {}: Failed to parse JSON object: {e}",
                    self.line_number
                ))
            })?;
            self.buffer.push_back(document);
        }

        Ok(true)
    }

}

impl<R: BufRead> RecordSource for JsonRecordSource<R> {
    fn next_record(&mut self) -> Result<Option<Record>> {
        if !self.started && !self.detect_format()? {
            return Ok(None);
        }

        if let Some(document) = self.buffer.pop_front() {
            return Ok(Some(document.into_record()));
        }
        if self.array_mode {
            return Ok(None);
        }

        let mut line = String::new();
        if !self.read_non_blank_line(&mut line)? {
            return Ok(None);
        }

        let document: RecordDocument = serde_json::from_str(line.trim()).map_err(|e| {
            Error::InvalidInput(format!(
                "Line {}: Failed to parse JSON: {e}",
                self.line_number
            ))
        })?;

        Ok(Some(document.into_record()))
    }

    fn size_hint(&self) -> Option<usize> {
        self.array_mode.then_some(self.buffer.len())
    }
}

/// JSON record writer.
///
/// Writes records as newline-delimited JSON (NDJSON).
pub struct JsonRecordWriter<W: Write> {
    writer: W,
    /// Number of records written.
    count: usize,
}

impl<W: Write> JsonRecordWriter<W> {
    /// Creates a new JSON record writer.
    #[must_use]
    pub const fn new(writer: W) -> Self {
        Self { writer, count: 0 }
    }
}

impl<W: Write + Send> RecordWriter for JsonRecordWriter<W> {
    fn write(&mut self, record: &Record) -> Result<()> {
        serde_json::to_writer(&mut self.writer, &RecordDocument::from(record)).map_err(|e| {
            Error::OperationFailed {
                operation: "write_json".to_string(),
                cause: e.to_string(),
            }
        })?;
        writeln!(self.writer).map_err(|e| Error::OperationFailed {
            operation: "write_json".to_string(),
            cause: e.to_string(),
        })?;
        self.count += 1;
        Ok(())
    }

    fn count(&self) -> usize {
        self.count
    }

    fn finalize(mut self: Box<Self>) -> Result<()> {
        self.writer.flush().map_err(|e| Error::OperationFailed {
            operation: "flush_json".to_string(),
            cause: e.to_string(),
        })
    }
}
