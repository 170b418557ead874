//! String-celled tables backed by delimited text files.
//!
//! Every layer of the pipeline is a `Table`: an ordered header row plus rows
//! of raw cell text. Typing happens in the transforms that need it, never at
//! read time, so a stray non-numeric cell survives until the stage that knows
//! how to treat it.
//!
//! Writes are atomic: the table is written to `{path}.tmp` and renamed into
//! place, so a crashed stage never leaves a truncated file behind.

use csv::{ReaderBuilder, WriterBuilder};
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from reading or writing tables.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed delimited data: {0}")]
    Csv(#[from] csv::Error),

    #[error("row {line} has {found} cells but the header has {expected}")]
    RaggedRow {
        line: u64,
        expected: usize,
        found: usize,
    },
}

impl TableError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        TableError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// An in-memory table of string cells.
///
/// Rows always have exactly `headers().len()` cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Build a table from string slices. Handy for tests and fixtures.
    pub fn from_rows(headers: &[&str], rows: &[&[&str]]) -> Self {
        let mut table = Self::new(headers.iter().map(|h| h.to_string()).collect());
        for row in rows {
            table.push_row(row.iter().map(|c| c.to_string()).collect());
        }
        table
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn width(&self) -> usize {
        self.headers.len()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by exact header name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cells of one column, top to bottom.
    pub fn column(&self, index: usize) -> impl Iterator<Item = &str> + '_ {
        self.rows.iter().map(move |row| row[index].as_str())
    }

    /// Replace every header through `f`.
    pub fn map_headers(&mut self, f: impl Fn(&str) -> String) {
        self.headers = self.headers.iter().map(|h| f(h.as_str())).collect();
    }

    /// Append a row, padding short rows with empty cells and dropping
    /// cells beyond the header width.
    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    /// Keep only the rows for which `keep` returns true.
    pub fn retain_rows(&mut self, mut keep: impl FnMut(&[String]) -> bool) {
        self.rows.retain(|row| keep(row.as_slice()));
    }

    /// Set (or append) a column from per-row values.
    ///
    /// If a column named `name` already exists it is overwritten in place.
    /// `values` must yield one cell per row.
    pub fn set_column(&mut self, name: &str, values: Vec<String>) {
        debug_assert_eq!(values.len(), self.rows.len());
        match self.column_index(name) {
            Some(idx) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[idx] = value;
                }
            }
            None => {
                self.headers.push(name.to_string());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
    }

    /// Parse a table from any reader. The first record is the header.
    ///
    /// Short rows are padded with empty cells; rows longer than the header
    /// are rejected.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, TableError> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = rdr.headers()?.iter().map(String::from).collect();
        let mut table = Table::new(headers);

        for result in rdr.records() {
            let record = result?;
            if record.len() > table.width() {
                return Err(TableError::RaggedRow {
                    line: record.position().map(|p| p.line()).unwrap_or(0),
                    expected: table.width(),
                    found: record.len(),
                });
            }
            table.push_row(record.iter().map(String::from).collect());
        }

        Ok(table)
    }

    /// Read a table from a delimited text file.
    pub fn read_csv(path: &Path) -> Result<Self, TableError> {
        let file = fs::File::open(path).map_err(|e| TableError::io(path, e))?;
        Self::from_reader(file)
    }

    /// Serialize the table to any writer.
    pub fn to_writer<W: Write>(&self, writer: W) -> Result<(), TableError> {
        if self.headers.is_empty() {
            return Ok(());
        }
        let mut wtr = WriterBuilder::new().from_writer(writer);
        wtr.write_record(&self.headers)?;
        for row in &self.rows {
            wtr.write_record(row)?;
        }
        wtr.flush().map_err(csv::Error::from)?;
        Ok(())
    }

    /// Serialized bytes of the table, exactly as `write_csv` would store them.
    pub fn to_csv_bytes(&self) -> Result<Vec<u8>, TableError> {
        let mut buf = Vec::new();
        self.to_writer(&mut buf)?;
        Ok(buf)
    }

    /// Write the table to `path` atomically, creating parent directories.
    pub fn write_csv(&self, path: &Path) -> Result<(), TableError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| TableError::io(parent, e))?;
            }
        }

        let bytes = self.to_csv_bytes()?;
        let tmp_path = tmp_path_for(path);
        fs::write(&tmp_path, &bytes).map_err(|e| TableError::io(&tmp_path, e))?;

        fs::rename(&tmp_path, path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            TableError::io(path, e)
        })
    }
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_header_and_rows() {
        let data = "Date,Close\n2024-01-02,101.5\n2024-01-03,102\n";
        let table = Table::from_reader(data.as_bytes()).unwrap();

        assert_eq!(table.headers(), &["Date", "Close"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[1], vec!["2024-01-03", "102"]);
    }

    #[test]
    fn short_rows_are_padded() {
        let data = "a,b,c\n1,2\n";
        let table = Table::from_reader(data.as_bytes()).unwrap();
        assert_eq!(table.rows()[0], vec!["1", "2", ""]);
    }

    #[test]
    fn long_rows_are_rejected() {
        let data = "a,b\n1,2,3\n";
        let err = Table::from_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            TableError::RaggedRow {
                expected: 2,
                found: 3,
                ..
            }
        ));
    }

    #[test]
    fn set_column_appends_then_overwrites() {
        let mut table = Table::from_rows(&["x"], &[&["1"], &["2"]]);
        table.set_column("y", vec!["a".into(), "b".into()]);
        assert_eq!(table.headers(), &["x", "y"]);

        table.set_column("y", vec!["c".into(), "d".into()]);
        assert_eq!(table.width(), 2);
        assert_eq!(table.rows()[1], vec!["2", "d"]);
    }

    #[test]
    fn serialization_is_stable() {
        let table = Table::from_rows(&["date", "note"], &[&["2024-01-02", "has,comma"]]);
        let bytes = table.to_csv_bytes().unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "date,note\n2024-01-02,\"has,comma\"\n"
        );

        let parsed = Table::from_reader(table.to_csv_bytes().unwrap().as_slice()).unwrap();
        assert_eq!(parsed, table);
    }

    #[test]
    fn write_is_atomic_and_creates_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("SPY_raw.csv");
        let table = Table::from_rows(&["a"], &[&["1"]]);

        table.write_csv(&path).unwrap();

        assert!(path.exists());
        assert!(!dir.path().join("nested").join("SPY_raw.csv.tmp").exists());
        assert_eq!(Table::read_csv(&path).unwrap(), table);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = Table::read_csv(Path::new("/nonexistent/table.csv")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/table.csv"));
    }
}
