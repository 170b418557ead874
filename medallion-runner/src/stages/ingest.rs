//! Stage 1: fetch each configured ticker into the bronze layer.

use super::{ensure_dir, Stage, StageError, StageSummary};
use crate::config::PipelineConfig;
use chrono::NaiveDate;
use medallion_core::data::{download_symbols, DataProvider, LogProgress};

/// Fetch `config.tickers` over the configured history window ending `today`.
pub fn run_ingest(
    config: &PipelineConfig,
    provider: &dyn DataProvider,
    today: NaiveDate,
) -> Result<StageSummary, StageError> {
    ensure_dir(&config.ingest_dir)?;

    let (start, end) = config.history_range(today);
    tracing::info!(
        provider = provider.name(),
        %start,
        %end,
        dir = %config.ingest_dir.display(),
        "ingest"
    );

    let download = download_symbols(
        provider,
        &config.ingest_dir,
        &config.symbols(),
        start,
        end,
        &LogProgress,
    );

    let mut summary = StageSummary::new(Stage::Ingest);
    summary.processed = download.total;
    summary.written = download
        .written
        .iter()
        .map(|p| super::file_name(p))
        .collect();
    summary.skipped = download.empty;
    summary.failures = download
        .errors
        .into_iter()
        .map(|(symbol, e)| (symbol, e.to_string()))
        .collect();
    Ok(summary)
}
