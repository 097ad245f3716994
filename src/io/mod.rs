//! Record I/O subsystem.
//!
//! Reads records into the pipeline and writes routed records back out.
//!
//! # Supported Formats
//!
//! | Format | Read | Write | Notes |
//! |--------|------|-------|-------|
//! | JSON | ✓ | ✓ | Reads NDJSON or an array, writes NDJSON |
//! | YAML | ✓ | ✓ | Sequence or document stream |
//! | CSV | ✓ | ✓ | Header row names the attributes |
//! | TSV | ✓ | ✓ | CSV with tab delimiters |
//!
//! # Example
//!
//! ```rust
//! use uniqflow::io::{Format, read_records};
//!
//! let input = "id,custom_id\nf0,1\nf1,1\n";
//! let records = read_records(input.as_bytes(), Format::Csv)?;
//!
//! assert_eq!(records.len(), 2);
//! assert_eq!(records[1].attribute("custom_id"), Some("1"));
//! # Ok::<(), uniqflow::Error>(())
//! ```

pub mod formats;
mod sink;
pub mod traits;

use crate::Result;
use crate::models::Record;
use std::io::BufRead;

pub use formats::{Format, create_record_source, create_record_writer};
pub use sink::{FileSink, FileSinkCounts};
pub use traits::{RecordDocument, RecordSource, RecordWriter};

/// Reads every record from `reader` in the given format, in input order.
///
/// # Errors
///
/// Returns an error if the input is malformed or cannot be read.
pub fn read_records<R: BufRead>(reader: R, format: Format) -> Result<Vec<Record>> {
    let mut source = create_record_source(reader, format)?;
    let mut records = Vec::with_capacity(source.size_hint().unwrap_or_default());
    while let Some(record) = source.next_record()? {
        records.push(record);
    }
    Ok(records)
}

/// Writes `records` through `writer` and finalizes it, returning the count.
///
/// # Errors
///
/// Returns an error if serialization or I/O fails.
pub fn write_records<'a, I>(mut writer: Box<dyn RecordWriter>, records: I) -> Result<usize>
where
    I: IntoIterator<Item = &'a Record>,
{
    for record in records {
        writer.write(record)?;
    }
    let count = writer.count();
    writer.finalize()?;
    Ok(count)
}
