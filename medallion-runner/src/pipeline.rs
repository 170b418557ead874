//! Straight-line run of the file stages: ingest → transform → metrics → load.

use crate::config::PipelineConfig;
use crate::stages::{run_ingest, run_load, run_metrics, run_transform, StageError, StageSummary};
use chrono::NaiveDate;
use medallion_core::data::DataProvider;

/// Run every stage in order. A stage-level error stops the run; per-file
/// failures are carried in the summaries.
pub fn run_pipeline(
    config: &PipelineConfig,
    provider: &dyn DataProvider,
    today: NaiveDate,
) -> Result<Vec<StageSummary>, StageError> {
    let mut summaries = Vec::with_capacity(4);
    summaries.push(run_ingest(config, provider, today)?);
    summaries.push(run_transform(config)?);
    summaries.push(run_metrics(config)?);
    summaries.push(run_load(config)?);

    let failures: usize = summaries.iter().map(|s| s.failures.len()).sum();
    tracing::info!(failures, "pipeline finished");
    Ok(summaries)
}
