//! Property tests for the silver and gold transforms.
//!
//! Uses proptest to verify:
//! 1. Daily return — first row undefined, then close[i]/close[i-1] - 1
//! 2. Volatility — defined exactly from the seventh return on, equal to the
//!    sample stddev of the trailing seven returns
//! 3. Row count — gold never has more rows than silver
//! 4. Idempotency — the same silver input always yields identical gold bytes

use medallion_core::clean::clean_table;
use medallion_core::metrics::{enrich, RETURN_COLUMN, VOLATILITY_COLUMN, VOLATILITY_WINDOW};
use medallion_core::Table;
use proptest::prelude::*;

// ── Helpers ──────────────────────────────────────────────────────────

fn close_table(closes: &[String]) -> Table {
    let mut table = Table::new(vec!["date".into(), "close".into()]);
    for (i, close) in closes.iter().enumerate() {
        table.push_row(vec![format!("day-{i:04}"), close.clone()]);
    }
    table
}

fn column(table: &Table, name: &str) -> Vec<Option<f64>> {
    let idx = table.column_index(name).expect("column present");
    table.column(idx).map(|c| c.parse::<f64>().ok()).collect()
}

fn close_enough(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_price() -> impl Strategy<Value = f64> {
    (1.0..1000.0_f64).prop_map(|p| (p * 100.0).round() / 100.0)
}

fn arb_cell() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => arb_price().prop_map(|p| p.to_string()),
        1 => Just(String::new()),
        1 => Just("NaN".to_string()),
        1 => Just("SQM".to_string()),
        1 => Just("n/a".to_string()),
    ]
}

proptest! {
    // ── 1. Daily return ──────────────────────────────────────────────

    #[test]
    fn daily_return_is_pct_change(prices in prop::collection::vec(arb_price(), 1..60)) {
        let cells: Vec<String> = prices.iter().map(|p| p.to_string()).collect();
        let mut table = close_table(&cells);
        enrich(&mut table).unwrap();

        let returns = column(&table, RETURN_COLUMN);
        prop_assert_eq!(returns.len(), prices.len());
        prop_assert!(returns[0].is_none());
        for i in 1..prices.len() {
            let expected = prices[i] / prices[i - 1] - 1.0;
            let actual = returns[i].unwrap();
            prop_assert!(close_enough(actual, expected), "row {}: {} vs {}", i, actual, expected);
        }
    }

    // ── 2. Volatility ────────────────────────────────────────────────

    #[test]
    fn volatility_is_trailing_sample_std(prices in prop::collection::vec(arb_price(), 1..60)) {
        let cells: Vec<String> = prices.iter().map(|p| p.to_string()).collect();
        let mut table = close_table(&cells);
        enrich(&mut table).unwrap();

        let returns = column(&table, RETURN_COLUMN);
        let vol = column(&table, VOLATILITY_COLUMN);

        for (i, v) in vol.iter().enumerate() {
            if i < VOLATILITY_WINDOW {
                prop_assert!(v.is_none(), "row {} should be undefined", i);
                continue;
            }
            let window: Vec<f64> = returns[(i + 1 - VOLATILITY_WINDOW)..=i]
                .iter()
                .map(|r| r.unwrap())
                .collect();
            let n = window.len() as f64;
            let mean = window.iter().sum::<f64>() / n;
            let var = window.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
            let actual = v.unwrap();
            prop_assert!(close_enough(actual, var.sqrt()), "row {}: {} vs {}", i, actual, var.sqrt());
        }
    }

    // ── 3. Row count ─────────────────────────────────────────────────

    #[test]
    fn gold_never_grows(cells in prop::collection::vec(arb_cell(), 0..80)) {
        let mut table = close_table(&cells);
        let clean = clean_table(&mut table);
        let gold = enrich(&mut table).unwrap();

        prop_assert!(clean.rows_out <= clean.rows_in);
        prop_assert!(gold.rows_out <= gold.rows_in);
        prop_assert!(gold.rows_out <= cells.len());
        prop_assert!(column(&table, "close").iter().all(|c| c.is_some()));
    }

    // ── 4. Idempotency ───────────────────────────────────────────────

    #[test]
    fn rerun_produces_identical_bytes(cells in prop::collection::vec(arb_cell(), 0..80)) {
        let mut first = close_table(&cells);
        clean_table(&mut first);
        enrich(&mut first).unwrap();

        let mut second = close_table(&cells);
        clean_table(&mut second);
        enrich(&mut second).unwrap();
        prop_assert_eq!(first.to_csv_bytes().unwrap(), second.to_csv_bytes().unwrap());

        // Enriching gold output again replaces the derived columns in place.
        enrich(&mut second).unwrap();
        prop_assert_eq!(first.to_csv_bytes().unwrap(), second.to_csv_bytes().unwrap());
    }
}
