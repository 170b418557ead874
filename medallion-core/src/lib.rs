//! Medallion Core — building blocks for the bronze/silver/gold price pipeline.
//!
//! This crate holds everything that does not depend on directory layout or
//! configuration:
//! - Data providers (Yahoo Finance, deterministic synthetic walk) and the
//!   circuit breaker that guards the network provider
//! - CSV-backed `Table` with atomic writes
//! - Silver cleaning (header normalization, missing-value removal)
//! - Gold metrics (daily return, rolling volatility) built on series indicators
//! - SQLite store for gold tables

pub mod clean;
pub mod data;
pub mod indicators;
pub mod layer;
pub mod metrics;
pub mod store;
pub mod table;

pub use layer::Layer;
pub use table::{Table, TableError};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: pipeline types can move between threads.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<Table>();
        require_sync::<Table>();
        require_send::<Layer>();
        require_sync::<Layer>();
        require_send::<data::RawBar>();
        require_sync::<data::RawBar>();
        require_send::<data::CircuitBreaker>();
        require_sync::<data::CircuitBreaker>();
        require_send::<data::SyntheticProvider>();
        require_sync::<data::SyntheticProvider>();
        require_send::<metrics::GoldSummary>();
        require_sync::<metrics::GoldSummary>();
    }
}
