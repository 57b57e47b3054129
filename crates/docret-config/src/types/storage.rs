//! Storage paths configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for on-disk storage locations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StorageConfig {
    /// Root directory for the record store and the vector index
    ///
    /// Overridable with the `DOCRET_DATA_DIR` environment variable.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl StorageConfig {
    /// Path of the record store under the data directory
    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join("store")
    }

    /// Path of the vector index dataset under the data directory
    pub fn index_path(&self) -> PathBuf {
        self.data_dir.join("vectors.lance")
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl crate::validation::Validate for StorageConfig {
    fn validate(&self) -> crate::error::Result<()> {
        use crate::error::ConfigError;

        if self.data_dir.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError {
                field: "storage.data_dir".to_string(),
                message: "Data directory cannot be empty".to_string(),
            });
        }

        Ok(())
    }
}

fn default_data_dir() -> PathBuf {
    match std::env::var("DOCRET_DATA_DIR") {
        Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => PathBuf::from(".docret"),
    }
}
