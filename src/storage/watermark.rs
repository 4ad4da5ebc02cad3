//! Named, monotonically advancing timestamps persisted as a JSON object.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::errors::BotError;
use crate::utils::fs::write_atomic;

pub const ALERT_WATERMARK: &str = "alert_timestamp";

#[derive(Debug, Clone)]
pub struct WatermarkStore {
    path: PathBuf,
    marks: BTreeMap<String, i64>,
}

impl WatermarkStore {
    /// Load the store at `path`; a missing file yields an empty store.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, BotError> {
        let marks = match fs::read(path) {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                BotError::StorageError(format!("{}: {e}", path.display()))
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No watermark file at {}, starting empty", path.display());
                BTreeMap::new()
            }
            Err(e) => {
                return Err(BotError::StorageError(format!("{}: {e}", path.display())));
            }
        };

        Ok(Self {
            path: path.to_path_buf(),
            marks,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current watermark for `key`, 0 when never set.
    #[must_use]
    pub fn get(&self, key: &str) -> i64 {
        self.marks.get(key).copied().unwrap_or(0)
    }

    /// Raise `key` to `timestamp`. Returns whether the stored value changed;
    /// a lower timestamp is ignored.
    pub fn advance(&mut self, key: &str, timestamp: i64) -> bool {
        let current = self.get(key);
        if timestamp > current {
            self.marks.insert(key.to_string(), timestamp);
            true
        } else {
            false
        }
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the atomic write fails.
    pub fn save(&self) -> Result<(), BotError> {
        let bytes = serde_json::to_vec(&self.marks)
            .map_err(|e| BotError::StorageError(format!("serialize: {e}")))?;
        write_atomic(&self.path, &bytes)
            .map_err(|e| BotError::StorageError(format!("{}: {e}", self.path.display())))
    }
}
