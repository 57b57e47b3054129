//! Vector index configuration

use serde::{Deserialize, Serialize};

/// Vector index configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndexConfig {
    /// Index backend to use
    #[serde(default)]
    pub backend: IndexBackend,
}

/// Vector index backend options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IndexBackend {
    /// Persistent lance dataset on disk
    Lance,

    /// Process-lifetime in-memory index (testing, small corpora)
    Memory,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            backend: IndexBackend::Lance,
        }
    }
}

impl Default for IndexBackend {
    fn default() -> Self {
        IndexBackend::Lance
    }
}

impl crate::validation::Validate for IndexConfig {
    fn validate(&self) -> crate::error::Result<()> {
        Ok(())
    }
}
