//! Gold metrics: daily return and rolling volatility.
//!
//! Takes a silver table for one symbol in chronological order and appends
//! `daily_return` and `volatility` columns.
//!
//! Steps:
//! 1. Pick the price column (`adj_close` if present, else `close`)
//! 2. Coerce it to numbers; unparsable cells become missing
//! 3. Drop rows with a missing price
//! 4. daily_return = pct change of price
//! 5. volatility = 7-row sample stddev of daily_return
//!
//! Undefined values are written as empty cells.

use crate::indicators::{PctChange, RollingStd, SeriesIndicator};
use crate::table::Table;
use thiserror::Error;

/// Price columns in order of preference.
pub const PRICE_COLUMNS: [&str; 2] = ["adj_close", "close"];

pub const RETURN_COLUMN: &str = "daily_return";
pub const VOLATILITY_COLUMN: &str = "volatility";
pub const VOLATILITY_WINDOW: usize = 7;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("no price column (expected one of {expected:?}); found {found:?}")]
    MissingPriceColumn {
        expected: [&'static str; 2],
        found: Vec<String>,
    },
}

/// What the gold transform did to one table.
#[derive(Debug, Clone, PartialEq)]
pub struct GoldSummary {
    pub price_column: String,
    pub rows_in: usize,
    pub rows_out: usize,
    /// Number of rows with a defined daily return.
    pub returns: usize,
    /// Number of rows with a defined volatility.
    pub volatility_points: usize,
    pub last_volatility: Option<f64>,
}

impl GoldSummary {
    pub fn dropped(&self) -> usize {
        self.rows_in - self.rows_out
    }
}

/// Index of the preferred price column.
pub fn select_price_column(table: &Table) -> Result<usize, MetricsError> {
    PRICE_COLUMNS
        .iter()
        .find_map(|name| table.column_index(name))
        .ok_or_else(|| MetricsError::MissingPriceColumn {
            expected: PRICE_COLUMNS,
            found: table.headers().to_vec(),
        })
}

/// Coerce a cell to a finite number.
pub fn parse_price(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Render a value for a table cell; NaN becomes an empty cell.
pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        format!("{value}")
    }
}

/// Turn a silver table into a gold table in place.
pub fn enrich(table: &mut Table) -> Result<GoldSummary, MetricsError> {
    let price_idx = select_price_column(table)?;
    let price_column = table.headers()[price_idx].clone();
    let rows_in = table.len();

    table.retain_rows(|row| parse_price(&row[price_idx]).is_some());

    let prices: Vec<f64> = table
        .column(price_idx)
        .map(|cell| parse_price(cell).unwrap_or(f64::NAN))
        .collect();

    table.set_column(&price_column, prices.iter().map(|p| format_value(*p)).collect());

    let returns = PctChange::new(RETURN_COLUMN).compute(&prices);
    let volatility = RollingStd::new(VOLATILITY_WINDOW, VOLATILITY_COLUMN).compute(&returns);

    let summary = GoldSummary {
        price_column,
        rows_in,
        rows_out: table.len(),
        returns: returns.iter().filter(|v| !v.is_nan()).count(),
        volatility_points: volatility.iter().filter(|v| !v.is_nan()).count(),
        last_volatility: volatility.last().copied().filter(|v| !v.is_nan()),
    };

    table.set_column(RETURN_COLUMN, returns.into_iter().map(format_value).collect());
    table.set_column(
        VOLATILITY_COLUMN,
        volatility.into_iter().map(format_value).collect(),
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    fn silver(closes: &[&str]) -> Table {
        let mut table = Table::new(vec!["date".into(), "close".into(), "volume".into()]);
        for (i, close) in closes.iter().enumerate() {
            table.push_row(vec![
                format!("2024-01-{:02}", i + 1),
                close.to_string(),
                "1000".into(),
            ]);
        }
        table
    }

    fn column_f64(table: &Table, name: &str) -> Vec<Option<f64>> {
        let idx = table.column_index(name).unwrap();
        table.column(idx).map(|c| c.parse::<f64>().ok()).collect()
    }

    #[test]
    fn appends_derived_columns() {
        let mut table = silver(&["10", "11", "12"]);
        enrich(&mut table).unwrap();
        assert_eq!(
            table.headers(),
            &["date", "close", "volume", "daily_return", "volatility"]
        );
    }

    #[test]
    fn daily_return_formula() {
        let mut table = silver(&["100", "110", "99"]);
        enrich(&mut table).unwrap();

        let returns = column_f64(&table, RETURN_COLUMN);
        assert_eq!(returns[0], None);
        assert_approx(returns[1].unwrap(), 0.1, DEFAULT_EPSILON);
        assert_approx(returns[2].unwrap(), 99.0 / 110.0 - 1.0, DEFAULT_EPSILON);
    }

    #[test]
    fn volatility_needs_seven_returns() {
        let closes: Vec<String> = (0..9).map(|i| format!("{}", 100 + i * i)).collect();
        let refs: Vec<&str> = closes.iter().map(|s| s.as_str()).collect();
        let mut table = silver(&refs);

        let summary = enrich(&mut table).unwrap();

        let vol = column_f64(&table, VOLATILITY_COLUMN);
        assert!(vol[..7].iter().all(|v| v.is_none()));
        assert!(vol[7].is_some());
        assert!(vol[8].is_some());
        assert_eq!(summary.returns, 8);
        assert_eq!(summary.volatility_points, 2);

        let returns: Vec<f64> = column_f64(&table, RETURN_COLUMN)[1..8]
            .iter()
            .map(|r| r.unwrap())
            .collect();
        let mean = returns.iter().sum::<f64>() / 7.0;
        let var = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / 6.0;
        assert_approx(vol[7].unwrap(), var.sqrt(), 1e-12);
    }

    #[test]
    fn non_numeric_prices_are_dropped() {
        let mut table = silver(&["SQM", "10", "abc", "12.5", "inf"]);
        let summary = enrich(&mut table).unwrap();

        assert_eq!(summary.rows_in, 5);
        assert_eq!(summary.rows_out, 2);
        assert_eq!(summary.dropped(), 3);
        let returns = column_f64(&table, RETURN_COLUMN);
        assert_approx(returns[1].unwrap(), 0.25, DEFAULT_EPSILON);
    }

    #[test]
    fn adjusted_close_is_preferred() {
        let mut table = Table::from_rows(
            &["date", "close", "adj_close"],
            &[
                &["2024-01-02", "10", "5"],
                &["2024-01-03", "10", "6"],
            ],
        );
        let summary = enrich(&mut table).unwrap();

        assert_eq!(summary.price_column, "adj_close");
        let returns = column_f64(&table, RETURN_COLUMN);
        assert_approx(returns[1].unwrap(), 0.2, DEFAULT_EPSILON);
    }

    #[test]
    fn missing_price_column_is_an_error() {
        let mut table = Table::from_rows(&["date", "open"], &[&["2024-01-02", "1"]]);
        let err = enrich(&mut table).unwrap_err();
        assert!(matches!(err, MetricsError::MissingPriceColumn { .. }));
    }

    #[test]
    fn empty_table_still_gets_headers() {
        let mut table = silver(&[]);
        let summary = enrich(&mut table).unwrap();
        assert_eq!(summary.rows_out, 0);
        assert_eq!(table.width(), 5);
        assert_eq!(summary.last_volatility, None);
    }

    #[test]
    fn rerun_on_gold_output_is_stable() {
        let mut table = silver(&["10", "10.5", "10.25", "11", "12", "11.5", "11.75", "12.5"]);
        enrich(&mut table).unwrap();
        let gold = table.clone();

        enrich(&mut table).unwrap();
        assert_eq!(table, gold);
    }

    #[test]
    fn price_cells_are_canonicalized() {
        let mut table = silver(&[" 10.50 ", "11"]);
        enrich(&mut table).unwrap();
        assert_eq!(table.rows()[0][1], "10.5");
    }
}
