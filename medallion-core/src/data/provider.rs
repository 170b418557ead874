//! Data provider trait and structured error types.
//!
//! The DataProvider trait abstracts over price sources (Yahoo Finance, the
//! deterministic synthetic walk) so the bronze stage can run offline and
//! tests never touch the network.

use crate::table::TableError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raw daily bar from a data provider.
///
/// Prices the provider had no value for are `f64::NAN`; they are written to
/// the bronze file as empty cells.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adj_close: f64,
    pub volume: u64,
}

/// Structured error types for data operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider")]
    RateLimited,

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("hard stop: data provider has blocked requests (circuit breaker tripped)")]
    CircuitBreakerTripped,

    #[error("failed to write bronze table: {0}")]
    Write(#[from] TableError),

    #[error("data error: {0}")]
    Other(String),
}

/// Result of a successful fetch for a single symbol.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub symbol: String,
    pub bars: Vec<RawBar>,
    pub source: DataSource,
}

/// Where the data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    YahooFinance,
    Synthetic,
}

/// Trait for price providers.
pub trait DataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch daily bars for a symbol over an inclusive date range.
    fn fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate)
        -> Result<FetchResult, DataError>;

    /// Whether the provider currently accepts requests.
    fn is_available(&self) -> bool;
}

/// Outcome of one symbol in a multi-symbol download.
#[derive(Debug)]
pub enum SymbolOutcome<'a> {
    Written { rows: usize },
    Empty,
    Failed(&'a DataError),
}

/// Progress callback for multi-symbol operations.
pub trait DownloadProgress {
    /// Called when starting to fetch a symbol.
    fn on_start(&self, symbol: &str, index: usize, total: usize);

    /// Called when a symbol has been handled.
    fn on_complete(&self, symbol: &str, index: usize, total: usize, outcome: SymbolOutcome<'_>);

    /// Called when the entire batch is done.
    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize);
}

/// Progress reporter that emits tracing events.
pub struct LogProgress;

impl DownloadProgress for LogProgress {
    fn on_start(&self, symbol: &str, index: usize, total: usize) {
        tracing::info!(%symbol, "[{}/{}] fetching", index + 1, total);
    }

    fn on_complete(&self, symbol: &str, _index: usize, _total: usize, outcome: SymbolOutcome<'_>) {
        match outcome {
            SymbolOutcome::Written { rows } => tracing::info!(%symbol, rows, "saved raw prices"),
            SymbolOutcome::Empty => tracing::warn!(%symbol, "no data found"),
            SymbolOutcome::Failed(e) => tracing::error!(%symbol, error = %e, "fetch failed"),
        }
    }

    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize) {
        tracing::info!(succeeded, failed, total, "download complete");
    }
}
