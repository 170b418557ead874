//! Stage 2: bronze → silver.
//!
//! Every `.csv` in the ingest directory is cleaned and written to the
//! transform directory, `_raw.csv` becoming `_clean.csv`.

use super::{ensure_dir, file_name, list_layer_files, Stage, StageError, StageSummary};
use crate::config::PipelineConfig;
use medallion_core::clean::clean_table;
use medallion_core::{Layer, Table};
use std::path::Path;

pub fn run_transform(config: &PipelineConfig) -> Result<StageSummary, StageError> {
    let inputs = list_layer_files(&config.ingest_dir, ".csv")?;
    ensure_dir(&config.transform_dir)?;

    let mut summary = StageSummary::new(Stage::Transform);
    for path in &inputs {
        summary.processed += 1;
        let name = file_name(path);
        match transform_file(path, &config.transform_dir) {
            Ok(out) => summary.written.push(out),
            Err(e) => summary.record_failure(&name, &e),
        }
    }
    Ok(summary)
}

fn transform_file(input: &Path, out_dir: &Path) -> Result<String, StageError> {
    let mut table = Table::read_csv(input)?;
    let report = clean_table(&mut table);

    let out_name = Layer::Bronze.promote(&file_name(input), Layer::Silver);
    table.write_csv(&out_dir.join(&out_name))?;

    tracing::info!(
        file = %out_name,
        rows = report.rows_out,
        dropped = report.dropped(),
        "cleaned"
    );
    Ok(out_name)
}
