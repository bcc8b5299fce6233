//! Cursor-style record source over CSV input.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use bind_core::{RawValue, RecordSource};
use csv::StringRecord;
use tracing::debug;

/// Configuration for reading CSV input
#[derive(Debug, Clone)]
pub struct Config {
    /// Whether the CSV has headers (default: true)
    pub has_headers: bool,

    /// CSV delimiter character (default: ',')
    pub delimiter: u8,

    /// Column names to use instead of the header row
    pub column_names: Option<Vec<String>>,

    /// Cell content that is read as null (default: empty cell)
    pub null_marker: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            has_headers: true,
            delimiter: b',',
            column_names: None,
            null_marker: String::new(),
        }
    }
}

/// A record source that walks CSV rows.
///
/// Cells are exposed as strings; a cell equal to the null marker is null.
/// The source starts before the first row and reports no fields until
/// [`CsvRecordSource::advance`] succeeds.
pub struct CsvRecordSource<R> {
    reader: csv::Reader<R>,
    headers: Vec<String>,
    current: Option<StringRecord>,
    null_marker: String,
    row_number: usize,
}

impl CsvRecordSource<File> {
    /// Open a CSV file.
    pub fn from_path(path: impl AsRef<Path>, config: Config) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open CSV file {}", path.display()))?;
        Self::new(file, config)
    }
}

impl<R: Read> CsvRecordSource<R> {
    /// Wrap a reader. The header row, if any, is read immediately.
    pub fn new(reader: R, config: Config) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(config.has_headers)
            .delimiter(config.delimiter)
            .flexible(true)
            .from_reader(reader);

        let headers = if let Some(column_names) = config.column_names {
            column_names
        } else if config.has_headers {
            reader
                .headers()
                .context("Failed to read CSV headers")?
                .iter()
                .map(|h| h.to_string())
                .collect()
        } else {
            // Generated from the first row's width
            Vec::new()
        };

        debug!("CSV headers/columns: {headers:?}");

        Ok(Self {
            reader,
            headers,
            current: None,
            null_marker: config.null_marker,
            row_number: 0,
        })
    }

    /// Move to the next row. Returns `false` once the input is exhausted.
    pub fn advance(&mut self) -> Result<bool> {
        let mut record = StringRecord::new();
        let has_row = self
            .reader
            .read_record(&mut record)
            .context("Failed to read CSV record")?;
        if !has_row {
            self.current = None;
            return Ok(false);
        }
        self.row_number += 1;

        if self.headers.is_empty() {
            self.headers = (0..record.len()).map(|i| format!("column_{i}")).collect();
            debug!("Generated CSV columns: {:?}", self.headers);
        }

        if record.len() != self.headers.len() {
            self.current = None;
            anyhow::bail!(
                "Column count mismatch in CSV row {}: expected {} columns ({}), but found {} columns",
                self.row_number,
                self.headers.len(),
                self.headers.join(", "),
                record.len()
            );
        }

        self.current = Some(record);
        Ok(true)
    }

    /// Column names, in order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// 1-based number of the current data row; 0 before the first row.
    pub fn row_number(&self) -> usize {
        self.row_number
    }

    fn cell(&self, index: usize) -> Option<&str> {
        self.current.as_ref().and_then(|record| record.get(index))
    }
}

impl<R: Read> RecordSource for CsvRecordSource<R> {
    fn field_count(&self) -> usize {
        match self.current {
            Some(_) => self.headers.len(),
            None => 0,
        }
    }

    fn column_name(&self, index: usize) -> &str {
        self.headers.get(index).map(String::as_str).unwrap_or_default()
    }

    fn is_null(&self, index: usize) -> bool {
        self.cell(index).map_or(true, |cell| cell == self.null_marker)
    }

    fn value(&self, index: usize) -> RawValue {
        match self.cell(index) {
            Some(cell) if cell != self.null_marker => RawValue::String(cell.to_string()),
            _ => RawValue::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const PEOPLE: &str = "OperatorId,FirstName,SurName\n5,John,Smith\n6,,Doe\n";

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.has_headers);
        assert_eq!(config.delimiter, b',');
        assert!(config.column_names.is_none());
        assert_eq!(config.null_marker, "");
    }

    #[test]
    fn test_walks_rows() {
        let mut source = CsvRecordSource::new(PEOPLE.as_bytes(), Config::default()).unwrap();
        assert_eq!(source.field_count(), 0);
        assert_eq!(source.headers(), ["OperatorId", "FirstName", "SurName"]);

        assert!(source.advance().unwrap());
        assert_eq!(source.row_number(), 1);
        assert_eq!(source.field_count(), 3);
        assert_eq!(source.column_name(2), "SurName");
        assert_eq!(source.value(0), RawValue::from("5"));
        assert!(!source.is_null(1));

        assert!(source.advance().unwrap());
        assert!(source.is_null(1));
        assert_eq!(source.value(1), RawValue::Null);

        assert!(!source.advance().unwrap());
        assert_eq!(source.field_count(), 0);
    }

    #[test]
    fn test_custom_null_marker_and_delimiter() {
        let config = Config {
            delimiter: b';',
            null_marker: "NULL".to_string(),
            ..Default::default()
        };
        let input = "a;b;c\nNULL;;x\n";
        let mut source = CsvRecordSource::new(input.as_bytes(), config).unwrap();

        assert!(source.advance().unwrap());
        assert!(source.is_null(0));
        assert!(!source.is_null(1));
        assert_eq!(source.value(1), RawValue::from(""));
        assert_eq!(source.value(2), RawValue::from("x"));
    }

    #[test]
    fn test_without_headers() {
        let config = Config {
            has_headers: false,
            ..Default::default()
        };
        let mut source = CsvRecordSource::new("1,2\n".as_bytes(), config).unwrap();
        assert!(source.headers().is_empty());

        assert!(source.advance().unwrap());
        assert_eq!(source.headers(), ["column_0", "column_1"]);
    }

    #[test]
    fn test_provided_column_names() {
        let config = Config {
            has_headers: false,
            column_names: Some(vec!["Id".to_string(), "Name".to_string()]),
            ..Default::default()
        };
        let mut source = CsvRecordSource::new("1,Alice\n".as_bytes(), config).unwrap();

        assert!(source.advance().unwrap());
        assert_eq!(source.column_name(1), "Name");
        assert_eq!(source.value(1), RawValue::from("Alice"));
    }

    #[test]
    fn test_column_count_mismatch() {
        let mut source =
            CsvRecordSource::new("a,b\n1,2,3\n".as_bytes(), Config::default()).unwrap();

        let err = source.advance().unwrap_err();
        assert!(err.to_string().contains("Column count mismatch in CSV row 1"));
        assert_eq!(source.field_count(), 0);
    }

    #[test]
    fn test_from_path() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{PEOPLE}").unwrap();
        temp_file.flush().unwrap();

        let mut source = CsvRecordSource::from_path(temp_file.path(), Config::default()).unwrap();
        let mut rows = 0;
        while source.advance().unwrap() {
            rows += 1;
        }
        assert_eq!(rows, 2);
    }

    #[test]
    fn test_missing_file() {
        let result = CsvRecordSource::from_path("/no/such/file.csv", Config::default());
        assert!(result.is_err());
    }
}
