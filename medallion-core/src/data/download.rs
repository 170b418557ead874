//! Download orchestrator: fetch each symbol and write its bronze file.
//!
//! A failing symbol is logged and recorded; the batch carries on with the
//! rest. If the provider becomes unavailable (circuit breaker open) the
//! remaining symbols are marked failed without further requests.

use super::ingest::{bronze_table, ingest};
use super::provider::{DataError, DataProvider, DownloadProgress, SymbolOutcome};
use crate::layer::Layer;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

/// Download `symbols` into `bronze_dir` as `<SYMBOL>_raw.csv`.
pub fn download_symbols(
    provider: &dyn DataProvider,
    bronze_dir: &Path,
    symbols: &[&str],
    start: NaiveDate,
    end: NaiveDate,
    progress: &dyn DownloadProgress,
) -> DownloadSummary {
    let total = symbols.len();
    let mut summary = DownloadSummary {
        total,
        ..DownloadSummary::default()
    };

    for (i, symbol) in symbols.iter().enumerate() {
        progress.on_start(symbol, i, total);

        match download_single(provider, bronze_dir, symbol, start, end) {
            Ok(Some((path, rows))) => {
                progress.on_complete(symbol, i, total, SymbolOutcome::Written { rows });
                summary.written.push(path);
            }
            Ok(None) => {
                progress.on_complete(symbol, i, total, SymbolOutcome::Empty);
                summary.empty.push(symbol.to_string());
            }
            Err(e) => {
                progress.on_complete(symbol, i, total, SymbolOutcome::Failed(&e));
                summary.errors.push((symbol.to_string(), e));
            }
        }

        if !provider.is_available() {
            for sym in &symbols[(i + 1)..] {
                summary
                    .errors
                    .push((sym.to_string(), DataError::CircuitBreakerTripped));
            }
            break;
        }
    }

    progress.on_batch_complete(summary.written.len(), summary.errors.len(), total);
    summary
}

/// Fetch → ingest → write. `None` when the provider returned no bars.
fn download_single(
    provider: &dyn DataProvider,
    bronze_dir: &Path,
    symbol: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Option<(PathBuf, usize)>, DataError> {
    let fetched = provider.fetch(symbol, start, end)?;
    if fetched.bars.is_empty() {
        return Ok(None);
    }

    let ingested = ingest(fetched.bars);
    if ingested.duplicates_removed > 0 {
        tracing::debug!(%symbol, removed = ingested.duplicates_removed, "dropped duplicate dates");
    }

    let path = bronze_dir.join(Layer::Bronze.file_name(symbol));
    bronze_table(&ingested.bars).write_csv(&path)?;
    Ok(Some((path, ingested.bars.len())))
}

/// Summary of a batch download.
#[derive(Debug, Default)]
pub struct DownloadSummary {
    pub total: usize,
    /// Bronze files written.
    pub written: Vec<PathBuf>,
    /// Symbols for which the provider returned no data.
    pub empty: Vec<String>,
    pub errors: Vec<(String, DataError)>,
}

impl DownloadSummary {
    pub fn all_succeeded(&self) -> bool {
        self.errors.is_empty() && self.empty.is_empty()
    }
}
