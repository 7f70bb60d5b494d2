use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, VidError};
use crate::provision::{DEFAULT_DATASET_FILE, DEFAULT_DATASET_URL};

/// Rows per batch for paged search and export.
pub const DEFAULT_PAGE_BATCH_ROWS: usize = 1_000;
/// Rows per batch for counting; larger batches trade memory for fewer passes.
pub const DEFAULT_COUNT_BATCH_ROWS: usize = 10_000;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScanConfig {
    pub dataset_path: PathBuf,
    pub dataset_url: String,
    pub page_batch_rows: usize,
    pub count_batch_rows: usize,
    /// Directory export files are written into.
    pub export_dir: PathBuf,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from(DEFAULT_DATASET_FILE),
            dataset_url: DEFAULT_DATASET_URL.to_string(),
            page_batch_rows: DEFAULT_PAGE_BATCH_ROWS,
            count_batch_rows: DEFAULT_COUNT_BATCH_ROWS,
            export_dir: PathBuf::from("."),
        }
    }
}

impl ScanConfig {
    /// Load a JSON config file; omitted keys fall back to defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let cfg: ScanConfig = serde_json::from_str(&raw)
            .map_err(|e| VidError::Config(format!("{}: {e}", path.display())))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load from `path` when given, else use defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.page_batch_rows == 0 || self.count_batch_rows == 0 {
            return Err(VidError::Config("batch sizes must be non-zero".into()));
        }
        Ok(())
    }
}
