//! Configuration type definitions
//!
//! This module contains all configuration structures organized by concern.
//! Each type is self-contained with validation and sensible defaults.

pub mod chunking;
pub mod embedding;
pub mod index;
pub mod retrieval;
pub mod storage;

// Re-export all types for convenience
pub use chunking::ChunkingConfig;
pub use embedding::{EmbeddingBackend, EmbeddingConfig};
pub use index::{IndexBackend, IndexConfig};
pub use retrieval::RetrievalConfig;
pub use storage::StorageConfig;

use serde::{Deserialize, Serialize};

/// Main configuration struct aggregating all settings
///
/// This is the top-level configuration that users interact with.
/// It's organized by functional area for clarity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Storage paths
    #[serde(default)]
    pub storage: StorageConfig,

    /// Text chunking behavior
    #[serde(default)]
    pub chunking: ChunkingConfig,

    /// Embedding provider settings
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Vector index settings
    #[serde(default)]
    pub index: IndexConfig,

    /// Query-time retrieval settings
    #[serde(default)]
    pub retrieval: RetrievalConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            chunking: ChunkingConfig::default(),
            embedding: EmbeddingConfig::default(),
            index: IndexConfig::default(),
            retrieval: RetrievalConfig::default(),
        }
    }
}

impl crate::validation::Validate for Config {
    fn validate(&self) -> crate::error::Result<()> {
        // Validate each sub-config
        self.storage.validate()?;
        self.chunking.validate()?;
        self.embedding.validate()?;
        self.index.validate()?;
        self.retrieval.validate()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::Validate;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_section_fails_aggregate() {
        let mut config = Config::default();
        config.chunking.overlap = config.chunking.chunk_size;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_document_parses_to_defaults() {
        let config: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
    }
}
