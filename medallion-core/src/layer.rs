//! Medallion layers and their file/table naming conventions.
//!
//! Bronze files are `<SYMBOL>_raw.csv`, silver `<SYMBOL>_clean.csv`, gold
//! `<SYMBOL>_gold.csv`. Gold tables in the store are named after the gold
//! file stem (`<SYMBOL>_gold`).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Data-quality tier of a pipeline artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    /// Raw provider output.
    Bronze,
    /// Normalized headers, no missing values.
    Silver,
    /// Silver plus derived return/volatility columns.
    Gold,
}

impl Layer {
    pub const ALL: [Layer; 3] = [Layer::Bronze, Layer::Silver, Layer::Gold];

    /// File suffix including the extension (e.g. `_raw.csv`).
    pub fn suffix(self) -> &'static str {
        match self {
            Layer::Bronze => "_raw.csv",
            Layer::Silver => "_clean.csv",
            Layer::Gold => "_gold.csv",
        }
    }

    /// File name for a symbol in this layer.
    pub fn file_name(self, symbol: &str) -> String {
        format!("{symbol}{}", self.suffix())
    }

    /// Extract the symbol from a file name belonging to this layer.
    pub fn symbol_of(self, file_name: &str) -> Option<&str> {
        file_name
            .strip_suffix(self.suffix())
            .filter(|sym| !sym.is_empty())
    }

    /// Name of the file produced when `file_name` from this layer is promoted
    /// to `next`.
    ///
    /// Names that don't carry this layer's suffix keep their name unchanged.
    pub fn promote(self, file_name: &str, next: Layer) -> String {
        match self.symbol_of(file_name) {
            Some(symbol) => next.file_name(symbol),
            None => file_name.to_string(),
        }
    }

    /// Store table name for a gold symbol.
    pub fn table_name(symbol: &str) -> String {
        format!("{symbol}_gold")
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Layer::Bronze => "bronze",
            Layer::Silver => "silver",
            Layer::Gold => "gold",
        };
        f.write_str(name)
    }
}
