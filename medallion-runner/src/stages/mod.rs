//! Pipeline stages.
//!
//! Each stage reads every matching file of one layer directory and writes the
//! next layer. A file (or symbol) that fails is logged and recorded in the
//! `StageSummary`; the stage carries on with the rest. Only stage-level
//! problems (unreadable input directory, output directory that cannot be
//! created, database that cannot be opened) surface as `Err`.

pub mod ingest;
pub mod load;
pub mod metrics;
pub mod transform;

pub use ingest::run_ingest;
pub use load::run_load;
pub use metrics::run_metrics;
pub use transform::run_transform;

use medallion_core::data::DataError;
use medallion_core::metrics::MetricsError;
use medallion_core::store::StoreError;
use medallion_core::TableError;
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Metrics(#[from] MetricsError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl StageError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        StageError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Ingest,
    Transform,
    Metrics,
    Load,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Ingest => "ingest",
            Stage::Transform => "transform",
            Stage::Metrics => "metrics",
            Stage::Load => "load",
        };
        f.write_str(name)
    }
}

/// Outcome of one stage run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageSummary {
    pub stage: Stage,
    /// Input files (or symbols) the stage attempted.
    pub processed: usize,
    /// Artifacts produced: file names, or table names for the load stage.
    pub written: Vec<String>,
    /// Inputs that produced nothing without being an error.
    pub skipped: Vec<String>,
    /// `(input, rendered error)` pairs.
    pub failures: Vec<(String, String)>,
}

impl StageSummary {
    pub fn new(stage: Stage) -> Self {
        Self {
            stage,
            processed: 0,
            written: Vec::new(),
            skipped: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    fn record_failure(&mut self, input: &str, error: &StageError) {
        tracing::error!(stage = %self.stage, input = %input, error = %error, "failed");
        self.failures.push((input.to_string(), error.to_string()));
    }
}

impl fmt::Display for StageSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<9} processed {:>3}  written {:>3}  skipped {:>3}  failed {:>3}",
            self.stage,
            self.processed,
            self.written.len(),
            self.skipped.len(),
            self.failures.len()
        )
    }
}

/// Files in `dir` whose names end with `suffix`, sorted by name.
///
/// A missing directory is an empty listing: the previous stage simply has
/// not produced anything yet.
pub fn list_layer_files(dir: &Path, suffix: &str) -> Result<Vec<PathBuf>, StageError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(dir = %dir.display(), "input directory does not exist");
            return Ok(Vec::new());
        }
        Err(e) => return Err(StageError::io(dir, e)),
    };

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| StageError::io(dir, e))?.path();
        if path.is_file() && file_name(&path).ends_with(suffix) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn ensure_dir(dir: &Path) -> Result<(), StageError> {
    fs::create_dir_all(dir).map_err(|e| StageError::io(dir, e))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
