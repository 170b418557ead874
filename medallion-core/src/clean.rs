//! Silver cleaning: header normalization and missing-value removal.
//!
//! Headers become lower-case with spaces replaced by underscores
//! (`"Adj Close"` → `adj_close`). Any row with a missing cell is dropped.
//! Present-but-non-numeric values are kept; typing is the gold stage's job.

use crate::table::Table;

/// Cell contents treated as missing, in addition to blank cells.
const NA_TOKENS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Normalize a single header: trimmed, lower-case, spaces to underscores.
pub fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase().replace(' ', "_")
}

/// Whether a cell counts as missing.
pub fn is_missing(cell: &str) -> bool {
    let trimmed = cell.trim();
    trimmed.is_empty() || NA_TOKENS.contains(&trimmed)
}

/// Outcome of cleaning one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanReport {
    pub rows_in: usize,
    pub rows_out: usize,
}

impl CleanReport {
    pub fn dropped(&self) -> usize {
        self.rows_in - self.rows_out
    }
}

/// Clean a table in place.
pub fn clean_table(table: &mut Table) -> CleanReport {
    let rows_in = table.len();
    table.retain_rows(|row| !row.iter().any(|cell| is_missing(cell)));
    table.map_headers(normalize_header);
    CleanReport {
        rows_in,
        rows_out: table.len(),
    }
}
