//! Stage 3: silver → gold.
//!
//! Only `_clean.csv` files are read; anything else in the transform
//! directory is left alone.

use super::{ensure_dir, file_name, list_layer_files, Stage, StageError, StageSummary};
use crate::config::PipelineConfig;
use medallion_core::metrics::enrich;
use medallion_core::{Layer, Table};
use std::path::Path;

pub fn run_metrics(config: &PipelineConfig) -> Result<StageSummary, StageError> {
    let inputs = list_layer_files(&config.transform_dir, Layer::Silver.suffix())?;
    ensure_dir(&config.analytics_dir)?;

    let mut summary = StageSummary::new(Stage::Metrics);
    for path in &inputs {
        summary.processed += 1;
        let name = file_name(path);
        match metrics_file(path, &config.analytics_dir) {
            Ok(out) => summary.written.push(out),
            Err(e) => summary.record_failure(&name, &e),
        }
    }
    Ok(summary)
}

fn metrics_file(input: &Path, out_dir: &Path) -> Result<String, StageError> {
    let mut table = Table::read_csv(input)?;
    let gold = enrich(&mut table)?;

    let out_name = Layer::Silver.promote(&file_name(input), Layer::Gold);
    table.write_csv(&out_dir.join(&out_name))?;

    tracing::info!(
        file = %out_name,
        price = %gold.price_column,
        rows = gold.rows_out,
        dropped = gold.dropped(),
        last_volatility = gold.last_volatility.unwrap_or(f64::NAN),
        "computed metrics"
    );
    Ok(out_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn missing_price_column_is_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig::default().rooted(dir.path());
        fs::create_dir_all(&config.transform_dir).unwrap();
        fs::write(
            config.transform_dir.join("SQM_clean.csv"),
            "date,close\n2024-01-02,10\n2024-01-03,11\n",
        )
        .unwrap();
        fs::write(
            config.transform_dir.join("XYZ_clean.csv"),
            "date,open\n2024-01-02,10\n",
        )
        .unwrap();

        let summary = run_metrics(&config).unwrap();

        assert_eq!(summary.written, vec!["SQM_gold.csv"]);
        assert_eq!(summary.failures.len(), 1);
        assert!(summary.failures[0].1.contains("no price column"));

        let gold = Table::read_csv(&config.analytics_dir.join("SQM_gold.csv")).unwrap();
        assert_eq!(gold.rows()[1][2], "0.1");
    }

    #[test]
    fn ignores_files_outside_the_silver_layer() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig::default().rooted(dir.path());
        fs::create_dir_all(&config.transform_dir).unwrap();
        fs::write(
            config.transform_dir.join("SQM_clean.csv"),
            "date,close\n2024-01-02,10\n2024-01-03,11\n",
        )
        .unwrap();
        fs::write(config.transform_dir.join("notes.csv"), "text\nhello\n").unwrap();
        fs::write(
            config.transform_dir.join("prices.csv"),
            "date,close\n2024-01-02,10\n",
        )
        .unwrap();

        let summary = run_metrics(&config).unwrap();

        assert_eq!(summary.processed, 1);
        assert_eq!(summary.written, vec!["SQM_gold.csv"]);
        assert!(summary.is_clean());
        assert!(!config.analytics_dir.join("prices.csv").exists());
    }
}
