//! Price providers and bronze ingest.

pub mod circuit_breaker;
pub mod download;
pub mod ingest;
pub mod provider;
pub mod synthetic;
pub mod yahoo;

pub use circuit_breaker::CircuitBreaker;
pub use download::{download_symbols, DownloadSummary};
pub use ingest::{bronze_table, ingest, IngestResult, RAW_HEADERS};
pub use provider::{
    DataError, DataProvider, DataSource, DownloadProgress, FetchResult, LogProgress, RawBar,
    SymbolOutcome,
};
pub use synthetic::SyntheticProvider;
pub use yahoo::YahooProvider;
