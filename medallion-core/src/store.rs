//! SQLite store for gold tables.
//!
//! Each gold file becomes one table named after the file stem
//! (`SQM_gold.csv` → `SQM_gold`). A load drops and recreates the table inside
//! a single transaction, so readers see either the previous table or the new
//! one. Column types are inferred from the cells: `INTEGER` when every present
//! cell is an integer, `REAL` when every present cell is a number, `TEXT`
//! otherwise. Missing cells are stored as `NULL`.
//!
//! Every load is recorded in the `pipeline_loads` manifest with the BLAKE3
//! digest of the source bytes.

use crate::clean::is_missing;
use crate::metrics::format_value;
use crate::table::{Table, TableError};
use rusqlite::types::{Value, ValueRef};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the load manifest table.
pub const MANIFEST_TABLE: &str = "pipeline_loads";

const MANIFEST_SQL: &str = "CREATE TABLE IF NOT EXISTS pipeline_loads (
    table_name   TEXT PRIMARY KEY,
    source_file  TEXT NOT NULL,
    row_count    INTEGER NOT NULL,
    content_hash TEXT NOT NULL
)";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Table(#[from] TableError),

    #[error("table {name} has no columns")]
    NoColumns { name: String },

    #[error("table not found: {name}")]
    TableNotFound { name: String },

    #[error("cannot derive a table name from {path}")]
    InvalidSource { path: PathBuf },
}

/// Storage class chosen for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Real,
    Text,
}

impl ColumnType {
    pub fn sql_name(self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Text => "TEXT",
        }
    }

    /// Narrowest type that holds every present cell. A column with no present
    /// cells is `TEXT`.
    pub fn infer<'a>(cells: impl IntoIterator<Item = &'a str>) -> Self {
        let mut present = cells.into_iter().filter(|c| !is_missing(c)).peekable();
        if present.peek().is_none() {
            return ColumnType::Text;
        }

        let mut ty = ColumnType::Integer;
        for cell in present {
            let cell = cell.trim();
            if ty == ColumnType::Integer && cell.parse::<i64>().is_ok() {
                continue;
            }
            if cell.parse::<f64>().is_ok() {
                ty = ColumnType::Real;
                continue;
            }
            return ColumnType::Text;
        }
        ty
    }

    fn value(self, cell: &str) -> Value {
        if is_missing(cell) {
            return Value::Null;
        }
        let trimmed = cell.trim();
        match self {
            ColumnType::Integer => trimmed
                .parse::<i64>()
                .map(Value::Integer)
                .unwrap_or(Value::Null),
            ColumnType::Real => trimmed
                .parse::<f64>()
                .map(Value::Real)
                .unwrap_or(Value::Null),
            ColumnType::Text => Value::Text(cell.to_string()),
        }
    }
}

/// One row of the `pipeline_loads` manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadRecord {
    pub table_name: String,
    pub source_file: String,
    pub row_count: usize,
    pub content_hash: String,
}

/// Quote an SQL identifier.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

pub struct GoldStore {
    conn: Connection,
}

impl GoldStore {
    /// Open (or create) the database file, creating parent directories.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(MANIFEST_SQL)?;
        Ok(Self { conn })
    }

    /// Load one gold file into the table named after its stem.
    pub fn load_file(&mut self, path: &Path) -> Result<LoadRecord, StoreError> {
        let table_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| StoreError::InvalidSource {
                path: path.to_path_buf(),
            })?
            .to_string();

        let bytes = fs::read(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Table::from_reader(bytes.as_slice())?;

        let record = LoadRecord {
            table_name,
            source_file: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            row_count: table.len(),
            content_hash: blake3::hash(&bytes).to_hex().to_string(),
        };

        self.write(&record, &table)?;
        Ok(record)
    }

    /// Replace `name` with the contents of `table`. Returns rows inserted.
    pub fn replace_table(&mut self, name: &str, table: &Table) -> Result<usize, StoreError> {
        let record = LoadRecord {
            table_name: name.to_string(),
            source_file: String::new(),
            row_count: table.len(),
            content_hash: blake3::hash(&table.to_csv_bytes()?).to_hex().to_string(),
        };
        self.write(&record, table)?;
        Ok(table.len())
    }

    fn write(&mut self, record: &LoadRecord, table: &Table) -> Result<(), StoreError> {
        if table.width() == 0 {
            return Err(StoreError::NoColumns {
                name: record.table_name.clone(),
            });
        }

        let types: Vec<ColumnType> = (0..table.width())
            .map(|idx| ColumnType::infer(table.column(idx)))
            .collect();

        let ident = quote_ident(&record.table_name);
        let columns = table
            .headers()
            .iter()
            .zip(&types)
            .map(|(h, t)| format!("{} {}", quote_ident(h), t.sql_name()))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = vec!["?"; table.width()].join(", ");

        let tx = self.conn.transaction()?;
        tx.execute_batch(&format!(
            "DROP TABLE IF EXISTS {ident}; CREATE TABLE {ident} ({columns});"
        ))?;
        {
            let mut insert = tx.prepare(&format!("INSERT INTO {ident} VALUES ({placeholders})"))?;
            for row in table.rows() {
                insert.execute(params_from_iter(
                    row.iter().zip(&types).map(|(cell, ty)| ty.value(cell)),
                ))?;
            }
        }
        tx.execute(
            "INSERT OR REPLACE INTO pipeline_loads (table_name, source_file, row_count, content_hash)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                record.table_name,
                record.source_file,
                record.row_count as i64,
                record.content_hash
            ],
        )?;
        tx.commit()?;

        tracing::debug!(table = %record.table_name, rows = record.row_count, "replaced table");
        Ok(())
    }

    pub fn has_table(&self, name: &str) -> Result<bool, StoreError> {
        let found: Option<String> = self
            .conn
            .query_row(
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// `SELECT *` from a table, rendered back into string cells.
    pub fn read_table(&self, name: &str) -> Result<Table, StoreError> {
        if !self.has_table(name)? {
            return Err(StoreError::TableNotFound {
                name: name.to_string(),
            });
        }

        let mut stmt = self
            .conn
            .prepare(&format!("SELECT * FROM {}", quote_ident(name)))?;
        let headers: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let width = headers.len();
        let mut table = Table::new(headers);

        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let mut cells = Vec::with_capacity(width);
            for idx in 0..width {
                cells.push(render_cell(row.get_ref(idx)?));
            }
            table.push_row(cells);
        }
        Ok(table)
    }

    /// Data tables, sorted by name. The manifest is excluded.
    pub fn tables(&self) -> Result<Vec<String>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master
             WHERE type = 'table' AND name != ?1 AND name NOT LIKE 'sqlite_%'
             ORDER BY name",
        )?;
        let names = stmt
            .query_map([MANIFEST_TABLE], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    /// Manifest rows, sorted by table name.
    pub fn loads(&self) -> Result<Vec<LoadRecord>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT table_name, source_file, row_count, content_hash
             FROM pipeline_loads ORDER BY table_name",
        )?;
        let records = stmt
            .query_map([], |row| {
                Ok(LoadRecord {
                    table_name: row.get(0)?,
                    source_file: row.get(1)?,
                    row_count: row.get::<_, i64>(2)?.max(0) as usize,
                    content_hash: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }
}

fn render_cell(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => format_value(f),
        ValueRef::Text(t) | ValueRef::Blob(t) => String::from_utf8_lossy(t).into_owned(),
    }
}
