//! Stage 4a: gold files → SQLite.

use super::{file_name, list_layer_files, Stage, StageError, StageSummary};
use crate::config::PipelineConfig;
use medallion_core::store::GoldStore;
use medallion_core::Layer;

pub fn run_load(config: &PipelineConfig) -> Result<StageSummary, StageError> {
    let inputs = list_layer_files(&config.analytics_dir, Layer::Gold.suffix())?;
    let mut store = GoldStore::open(&config.database)?;

    let mut summary = StageSummary::new(Stage::Load);
    for path in &inputs {
        summary.processed += 1;
        let name = file_name(path);
        match store.load_file(path) {
            Ok(record) => {
                tracing::info!(
                    table = %record.table_name,
                    rows = record.row_count,
                    hash = &record.content_hash[..12],
                    "loaded"
                );
                summary.written.push(record.table_name);
            }
            Err(e) => summary.record_failure(&name, &StageError::from(e)),
        }
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use medallion_core::Table;
    use std::fs;

    #[test]
    fn loads_every_gold_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig::default().rooted(dir.path());
        fs::create_dir_all(&config.analytics_dir).unwrap();
        for sym in ["SQM", "SCCO"] {
            Table::from_rows(&["date", "close"], &[&["2024-01-02", "10"]])
                .write_csv(&config.analytics_dir.join(Layer::Gold.file_name(sym)))
                .unwrap();
        }
        fs::write(config.analytics_dir.join("scratch.csv"), "x\n1\n").unwrap();

        let summary = run_load(&config).unwrap();

        assert_eq!(summary.written, vec!["SCCO_gold", "SQM_gold"]);
        let store = GoldStore::open(&config.database).unwrap();
        assert_eq!(store.tables().unwrap(), vec!["SCCO_gold", "SQM_gold"]);
    }
}
