//! Result persistence.
//!
//! Records are written as pretty-printed JSON under a results directory
//! (created on demand). Loading goes through [`normalize_record`] so the
//! reader accepts historical shapes alongside the current one.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use crate::config::DEFAULT_RESULTS_DIR;
use crate::error::SimError;
use crate::record::{normalize_record, ScalingRecord};

/// Directory results are written to.
#[derive(Debug, Clone)]
pub struct ResultsDir {
    root: PathBuf,
}

impl Default for ResultsDir {
    fn default() -> Self {
        Self::new(DEFAULT_RESULTS_DIR)
    }
}

impl ResultsDir {
    /// Use `root` as the results directory. Nothing is created until the
    /// first save.
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// Path a record with this file name would be written to.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Write `record` as pretty-printed JSON to `<root>/<name>`.
    ///
    /// Creates the directory if it does not exist yet.
    pub fn save(&self, name: &str, record: &ScalingRecord) -> Result<PathBuf, SimError> {
        fs::create_dir_all(&self.root).map_err(|source| SimError::Io {
            path: self.root.clone(),
            source,
        })?;
        let path = self.path_for(name);
        let text = serde_json::to_string_pretty(record)?;
        fs::write(&path, text).map_err(|source| SimError::Io {
            path: path.clone(),
            source,
        })?;
        info!("wrote {}", path.display());
        Ok(path)
    }

    /// Load and normalize the record at `<root>/<name>`.
    pub fn load(&self, name: &str) -> Result<ScalingRecord, SimError> {
        load_record(&self.path_for(name))
    }
}

/// Load and normalize the record at an arbitrary path.
pub fn load_record(path: &Path) -> Result<ScalingRecord, SimError> {
    let text = fs::read_to_string(path).map_err(|source| SimError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let value: serde_json::Value = serde_json::from_str(&text)?;
    normalize_record(&value)
}
