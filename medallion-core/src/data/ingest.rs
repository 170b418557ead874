//! Bronze ingest: provider bars to a raw price table.
//!
//! Bars are sorted by date and de-duplicated per date (first occurrence
//! wins) before they are written, so every bronze file is chronological and
//! unique per (symbol, date).

use super::provider::RawBar;
use crate::metrics::format_value;
use crate::table::Table;

/// Header row of every bronze file.
pub const RAW_HEADERS: [&str; 7] = ["Date", "Open", "High", "Low", "Close", "Adj Close", "Volume"];

const ADJ_CLOSE_HEADER: &str = "Adj Close";

/// Bars after ordering and de-duplication.
#[derive(Debug, Clone)]
pub struct IngestResult {
    pub bars: Vec<RawBar>,
    pub duplicates_removed: usize,
}

/// Sort bars by date and drop repeated dates.
pub fn ingest(mut bars: Vec<RawBar>) -> IngestResult {
    let before = bars.len();
    // Stable sort keeps the provider's first bar first among equal dates.
    bars.sort_by_key(|b| b.date);
    bars.dedup_by_key(|b| b.date);
    IngestResult {
        duplicates_removed: before - bars.len(),
        bars,
    }
}

/// Render bars as a bronze table. Missing prices become empty cells.
///
/// The `Adj Close` column is left out when no bar carries an adjusted
/// close, so downstream stages price on `Close` instead of cleaning away
/// every row.
pub fn bronze_table(bars: &[RawBar]) -> Table {
    let with_adj = bars.iter().any(|b| !b.adj_close.is_nan());
    let headers = RAW_HEADERS
        .iter()
        .filter(|h| with_adj || **h != ADJ_CLOSE_HEADER)
        .map(|h| h.to_string())
        .collect();

    let mut table = Table::new(headers);
    for bar in bars {
        let mut row = vec![
            bar.date.format("%Y-%m-%d").to_string(),
            format_value(bar.open),
            format_value(bar.high),
            format_value(bar.low),
            format_value(bar.close),
        ];
        if with_adj {
            row.push(format_value(bar.adj_close));
        }
        row.push(bar.volume.to_string());
        table.push_row(row);
    }
    table
}
