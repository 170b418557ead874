//! Pipeline configuration.
//!
//! Loaded from a TOML file. Every key is optional; anything missing falls
//! back to the defaults below, and a missing file yields the defaults
//! outright.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Directory layout, ticker universe and report settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Symbols fetched by the ingest stage.
    pub tickers: Vec<String>,
    /// Days of history requested, counted back from today.
    pub history_days: u32,
    /// Bronze layer.
    pub ingest_dir: PathBuf,
    /// Silver layer.
    pub transform_dir: PathBuf,
    /// Gold layer.
    pub analytics_dir: PathBuf,
    pub database: PathBuf,
    pub reports_dir: PathBuf,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Symbol whose gold table is charted.
    pub symbol: String,
    /// Number of most recent rows plotted.
    pub tail: usize,
    pub width: u16,
    pub height: u16,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            tickers: vec!["SQM".into(), "SCCO".into(), "IVPAF".into()],
            history_days: 730,
            ingest_dir: PathBuf::from("ingest"),
            transform_dir: PathBuf::from("transform"),
            analytics_dir: PathBuf::from("analytics"),
            database: PathBuf::from("market_data.db"),
            reports_dir: PathBuf::from("reports"),
            report: ReportConfig::default(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            symbol: "SQM".into(),
            tail: 30,
            width: 120,
            height: 30,
        }
    }
}

/// Smallest chart the report renders legibly.
const MIN_CHART_WIDTH: u16 = 20;
const MIN_CHART_HEIGHT: u16 = 8;

impl PipelineConfig {
    /// Load from `path`. A missing file yields the defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(bad) = self
            .tickers
            .iter()
            .find(|t| t.trim().is_empty() || t.contains(['/', '\\']))
        {
            return Err(ConfigError::Invalid(format!("ticker {bad:?} is not a symbol")));
        }
        if self.history_days == 0 {
            return Err(ConfigError::Invalid("history_days must be at least 1".into()));
        }
        if self.report.tail == 0 {
            return Err(ConfigError::Invalid("report.tail must be at least 1".into()));
        }
        if self.report.width < MIN_CHART_WIDTH || self.report.height < MIN_CHART_HEIGHT {
            return Err(ConfigError::Invalid(format!(
                "report chart must be at least {MIN_CHART_WIDTH}x{MIN_CHART_HEIGHT}"
            )));
        }
        Ok(())
    }

    /// Resolve every relative path against `root`.
    pub fn rooted(mut self, root: &Path) -> Self {
        for path in [
            &mut self.ingest_dir,
            &mut self.transform_dir,
            &mut self.analytics_dir,
            &mut self.database,
            &mut self.reports_dir,
        ] {
            if path.is_relative() {
                *path = root.join(&*path);
            }
        }
        self
    }

    /// Inclusive fetch window ending at `today`.
    pub fn history_range(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        (today - Duration::days(i64::from(self.history_days)), today)
    }

    pub fn symbols(&self) -> Vec<&str> {
        self.tickers.iter().map(String::as_str).collect()
    }
}
