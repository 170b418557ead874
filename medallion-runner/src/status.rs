//! What each layer currently holds.

use crate::config::PipelineConfig;
use crate::stages::{list_layer_files, StageError};
use medallion_core::store::{GoldStore, LoadRecord};
use medallion_core::Layer;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub struct LayerStatus {
    pub layer: Layer,
    pub dir: PathBuf,
    /// File names carrying the layer's suffix, sorted.
    pub files: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineStatus {
    pub layers: Vec<LayerStatus>,
    /// Load manifest; empty when the database does not exist yet.
    pub loads: Vec<LoadRecord>,
    pub database: PathBuf,
}

/// Inspect the layer directories and the store without modifying anything.
pub fn collect_status(config: &PipelineConfig) -> Result<PipelineStatus, StageError> {
    let mut layers = Vec::with_capacity(Layer::ALL.len());
    for layer in Layer::ALL {
        let dir = match layer {
            Layer::Bronze => &config.ingest_dir,
            Layer::Silver => &config.transform_dir,
            Layer::Gold => &config.analytics_dir,
        };
        let files = list_layer_files(dir, layer.suffix())?
            .iter()
            .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .collect();
        layers.push(LayerStatus {
            layer,
            dir: dir.clone(),
            files,
        });
    }

    // Opening would create the file; a status check must not.
    let loads = if config.database.exists() {
        GoldStore::open(&config.database)?.loads()?
    } else {
        Vec::new()
    };

    Ok(PipelineStatus {
        layers,
        loads,
        database: config.database.clone(),
    })
}

impl fmt::Display for PipelineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for status in &self.layers {
            writeln!(
                f,
                "{:<7} {} ({} files)",
                status.layer,
                status.dir.display(),
                status.files.len()
            )?;
            for name in &status.files {
                writeln!(f, "        {name}")?;
            }
        }
        writeln!(f, "store   {} ({} tables)", self.database.display(), self.loads.len())?;
        for load in &self.loads {
            writeln!(
                f,
                "        {:<16} {:>6} rows  {}  {}",
                load.table_name,
                load.row_count,
                &load.content_hash[..load.content_hash.len().min(12)],
                load.source_file
            )?;
        }
        Ok(())
    }
}
