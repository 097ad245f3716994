//! Format adapters for reading and writing records.
//!
//! Each format implements [`RecordSource`] and [`RecordWriter`].

pub mod csv;
pub mod json;
pub mod yaml;

use crate::{Error, Result};
use std::io::{BufRead, Write};
use std::path::Path;
use std::str::FromStr;

use super::traits::{RecordSource, RecordWriter};

/// Supported record file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// JSON format (newline-delimited or array).
    Json,
    /// YAML format (sequence or document stream).
    Yaml,
    /// CSV format with a header row.
    Csv,
    /// Tab-separated variant of [`Format::Csv`].
    Tsv,
}

impl Format {
    /// Returns all available formats.
    #[must_use]
    pub const fn all() -> [Self; 4] {
        [Self::Json, Self::Yaml, Self::Csv, Self::Tsv]
    }

    /// Returns the file extension for this format.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
            Self::Csv => "csv",
            Self::Tsv => "tsv",
        }
    }

    /// Detects format from file extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the extension is not recognized.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        match ext.as_deref() {
            Some("json" | "ndjson" | "jsonl") => Ok(Self::Json),
            Some("yaml" | "yml") => Ok(Self::Yaml),
            Some("csv") => Ok(Self::Csv),
            Some("tsv" | "tab") => Ok(Self::Tsv),
            Some(ext) => Err(Error::InvalidInput(format!(
                "Unsupported file extension: .{ext}"
            ))),
            None => Err(Error::InvalidInput(
                "Cannot determine format: file has no extension".to_string(),
            )),
        }
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" | "ndjson" | "jsonl" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            "csv" => Ok(Self::Csv),
            "tsv" | "tab" => Ok(Self::Tsv),
            _ => Err(Error::InvalidInput(format!("Unknown format: {s}"))),
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Creates a record source for the given format and reader.
///
/// # Errors
///
/// Returns an error if the input cannot be opened in that format.
pub fn create_record_source<'a, R: BufRead + 'a>(
    reader: R,
    format: Format,
) -> Result<Box<dyn RecordSource + 'a>> {
    match format {
        Format::Json => Ok(Box::new(json::JsonRecordSource::new(reader))),
        Format::Yaml => Ok(Box::new(yaml::YamlRecordSource::new(reader)?)),
        Format::Csv => Ok(Box::new(csv::CsvRecordSource::new(reader)?)),
        Format::Tsv => Ok(Box::new(csv::CsvRecordSource::with_delimiter(
            reader,
            csv::TAB,
        )?)),
    }
}

/// Creates a record writer for the given format and writer.
#[must_use]
pub fn create_record_writer<W: Write + Send + 'static>(
    writer: W,
    format: Format,
) -> Box<dyn RecordWriter> {
    match format {
        Format::Json => Box::new(json::JsonRecordWriter::new(writer)),
        Format::Yaml => Box::new(yaml::YamlRecordWriter::new(writer)),
        Format::Csv => Box::new(csv::CsvRecordWriter::new(writer)),
        Format::Tsv => Box::new(csv::CsvRecordWriter::with_delimiter(writer, csv::TAB)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("json", Format::Json)]
    #[test_case("NDJSON", Format::Json)]
    #[test_case("YAML", Format::Yaml)]
    #[test_case("yml", Format::Yaml)]
    #[test_case("csv", Format::Csv)]
    #[test_case("TSV", Format::Tsv)]
    fn test_format_from_str(input: &str, expected: Format) {
        assert_eq!(Format::from_str(input).unwrap(), expected);
    }

    #[test]
    fn test_format_from_str_unknown() {
        assert!(Format::from_str("parquet").is_err());
    }

    #[test_case("records.json", Format::Json)]
    #[test_case("records.jsonl", Format::Json)]
    #[test_case("records.yml", Format::Yaml)]
    #[test_case("dir/records.CSV", Format::Csv)]
    #[test_case("in.tsv", Format::Tsv)]
    fn test_format_from_path(path: &str, expected: Format) {
        assert_eq!(Format::from_path(Path::new(path)).unwrap(), expected);
    }

    #[test]
    fn test_format_from_path_rejects() {
        assert!(Format::from_path(Path::new("records.txt")).is_err());
        assert!(Format::from_path(Path::new("records")).is_err());
    }

    #[test]
    fn test_tsv_path_reads_tab_separated_fields() {
        let format = Format::from_path(Path::new("in.tsv")).unwrap();
        let input = "custom_id\tcustom_value\n1\t123\n1\t456\n";

        let mut source = create_record_source(input.as_bytes(), format).unwrap();
        let first = source.next_record().unwrap().unwrap();

        assert_eq!(first.attribute("custom_id"), Some("1"));
        assert_eq!(first.attribute("custom_value"), Some("123"));
        assert!(first.attribute("custom_id\tcustom_value").is_none());
    }

    #[test]
    fn test_tsv_writer_uses_tabs() {
        let mut output = Vec::new();
        {
            let mut writer =
                super::csv::CsvRecordWriter::with_delimiter(&mut output, super::csv::TAB);
            writer
                .write(&crate::models::Record::with_id("a").with_attribute("k", "x,y"))
                .unwrap();
            Box::new(writer).finalize().unwrap();
        }

        let text = String::from_utf8(output).unwrap();
        assert_eq!(text, "id\tk\tuuid\na\tx,y\ta\n");
    }

    #[test]
    fn test_display_matches_extension() {
        for format in Format::all() {
            assert_eq!(format.to_string(), format.extension());
            assert_eq!(Format::from_str(&format.to_string()).unwrap(), format);
        }
    }
}
