//! Medallion Runner — configuration and stage orchestration.
//!
//! This crate builds on `medallion-core` to provide:
//! - TOML pipeline configuration with defaults for every key
//! - The four file stages (ingest, transform, metrics, load) with sorted
//!   directory scans and per-file try/continue
//! - A full pipeline run and a read-only status view of every layer

pub mod config;
pub mod pipeline;
pub mod stages;
pub mod status;

pub use config::{ConfigError, PipelineConfig, ReportConfig};
pub use pipeline::run_pipeline;
pub use stages::{
    run_ingest, run_load, run_metrics, run_transform, Stage, StageError, StageSummary,
};
pub use status::{collect_status, LayerStatus, PipelineStatus};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn config_is_send_sync() {
        assert_send::<PipelineConfig>();
        assert_sync::<PipelineConfig>();
    }

    #[test]
    fn summaries_are_send_sync() {
        assert_send::<StageSummary>();
        assert_sync::<StageSummary>();
        assert_send::<StageError>();
    }
}
