//! Market summary: chart the most recent closes of one gold table.
//!
//! Column discovery follows the gold layout loosely so that hand-made tables
//! chart too: the first column holds dates, and the price is the `close`
//! column when there is one, otherwise the fifth column.

use crate::chart::{PriceChart, PricePoint};
use crate::render::render_to_text;
use chrono::NaiveDate;
use medallion_core::metrics::parse_price;
use medallion_core::store::{GoldStore, StoreError};
use medallion_core::{Layer, Table};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File written into the reports directory.
pub const REPORT_FILE: &str = "market_summary.txt";

/// Fallback price column position when there is no `close` header.
const FALLBACK_PRICE_INDEX: usize = 4;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("database {path} does not exist (run the load stage first)")]
    MissingDatabase { path: PathBuf },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("table {table} has no price column (no `close` and fewer than {} columns)", FALLBACK_PRICE_INDEX + 1)]
    NoPriceColumn { table: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOptions {
    pub symbol: String,
    /// Number of most recent rows plotted.
    pub tail: usize,
    pub width: u16,
    pub height: u16,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            symbol: "SQM".into(),
            tail: 30,
            width: 120,
            height: 30,
        }
    }
}

/// A plottable series pulled out of a table.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    pub date_column: String,
    pub price_column: String,
    pub points: Vec<PricePoint>,
    /// Rows dropped for an unparsable date or price.
    pub skipped: usize,
}

impl PriceSeries {
    /// Keep only the last `n` points.
    pub fn tail(mut self, n: usize) -> Self {
        let excess = self.points.len().saturating_sub(n);
        self.points.drain(..excess);
        self
    }
}

/// `YYYY-MM-DD`, ignoring any trailing time component.
pub fn parse_date(cell: &str) -> Option<NaiveDate> {
    let day = cell.trim().get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// Pull the date/price series out of `table`.
pub fn extract_series(table_name: &str, table: &Table) -> Result<PriceSeries, ReportError> {
    let no_price = || ReportError::NoPriceColumn {
        table: table_name.to_string(),
    };
    let date_idx = 0;
    let price_idx = match table.column_index("close") {
        Some(idx) => idx,
        None if table.width() > FALLBACK_PRICE_INDEX => FALLBACK_PRICE_INDEX,
        None => return Err(no_price()),
    };

    let mut points = Vec::with_capacity(table.len());
    let mut skipped = 0;
    for row in table.rows() {
        match (parse_date(&row[date_idx]), parse_price(&row[price_idx])) {
            (Some(date), Some(price)) => points.push(PricePoint { date, price }),
            _ => skipped += 1,
        }
    }

    Ok(PriceSeries {
        date_column: table.headers()[date_idx].clone(),
        price_column: table.headers()[price_idx].clone(),
        points,
        skipped,
    })
}

/// Render the chart for `series` as text.
pub fn render_series(series: &PriceSeries, options: &ReportOptions) -> String {
    render_to_text(
        PriceChart::new(&series.points, &options.symbol, &series.date_column),
        options.width,
        options.height,
    )
}

/// Read `<symbol>_gold` from the database and write the chart to
/// `<reports_dir>/market_summary.txt`. Returns the written path.
pub fn render_dashboard(
    database: &Path,
    reports_dir: &Path,
    options: &ReportOptions,
) -> Result<PathBuf, ReportError> {
    if !database.exists() {
        return Err(ReportError::MissingDatabase {
            path: database.to_path_buf(),
        });
    }

    let table_name = Layer::table_name(&options.symbol);
    let store = GoldStore::open(database)?;
    let table = store.read_table(&table_name)?;

    let series = extract_series(&table_name, &table)?.tail(options.tail);
    if series.skipped > 0 {
        tracing::warn!(table = %table_name, skipped = series.skipped, "rows without a date or price");
    }
    let text = render_series(&series, options);

    let path = reports_dir.join(REPORT_FILE);
    write_atomic(&path, text.as_bytes())?;
    tracing::info!(
        path = %path.display(),
        points = series.points.len(),
        price = %series.price_column,
        "report written"
    );
    Ok(path)
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), ReportError> {
    let io = |path: &Path| {
        let path = path.to_path_buf();
        move |source: std::io::Error| ReportError::Io { path, source }
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io(parent))?;
    }
    let tmp = path.with_extension("txt.tmp");
    fs::write(&tmp, bytes).map_err(io(&tmp))?;
    fs::rename(&tmp, path).map_err(io(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dates_ignore_time_component() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert_eq!(parse_date("2024-01-02"), Some(d));
        assert_eq!(parse_date("2024-01-02 00:00:00-05:00"), Some(d));
        assert_eq!(parse_date("2024-01-02T00:00:00"), Some(d));
        assert_eq!(parse_date("Ticker"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn prefers_close_column() {
        let table = Table::from_rows(
            &["date", "open", "close"],
            &[&["2024-01-02", "1", "10"], &["2024-01-03", "1", "11"]],
        );
        let series = extract_series("T_gold", &table).unwrap();
        assert_eq!(series.price_column, "close");
        assert_eq!(series.points[1].price, 11.0);
    }

    #[test]
    fn falls_back_to_fifth_column() {
        let table = Table::from_rows(
            &["Date", "a", "b", "c", "Price"],
            &[&["2024-01-02", "1", "2", "3", "4.5"]],
        );
        let series = extract_series("T_gold", &table).unwrap();
        assert_eq!(series.date_column, "Date");
        assert_eq!(series.price_column, "Price");
        assert_eq!(series.points[0].price, 4.5);
    }

    #[test]
    fn narrow_table_without_close_is_an_error() {
        let table = Table::from_rows(&["date", "open"], &[&["2024-01-02", "1"]]);
        let err = extract_series("T_gold", &table).unwrap_err();
        assert!(matches!(err, ReportError::NoPriceColumn { .. }));
    }

    #[test]
    fn unparsable_rows_are_skipped_and_tail_keeps_latest() {
        let table = Table::from_rows(
            &["date", "close"],
            &[
                &["2024-01-02", "10"],
                &["garbage", "11"],
                &["2024-01-04", ""],
                &["2024-01-05", "12"],
                &["2024-01-08", "13"],
            ],
        );
        let series = extract_series("T_gold", &table).unwrap().tail(2);
        assert_eq!(series.skipped, 2);
        let prices: Vec<f64> = series.points.iter().map(|p| p.price).collect();
        assert_eq!(prices, vec![12.0, 13.0]);
    }

    #[test]
    fn missing_database_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = render_dashboard(
            &dir.path().join("market_data.db"),
            &dir.path().join("reports"),
            &ReportOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ReportError::MissingDatabase { .. }));
        assert!(!dir.path().join("market_data.db").exists());
    }
}
