//! Text chunking configuration

use serde::{Deserialize, Serialize};

/// Configuration for text chunking
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChunkingConfig {
    /// Maximum characters per chunk
    ///
    /// Chunks never exceed this length, with one exception: a single
    /// sentence longer than `chunk_size` is emitted whole rather than
    /// split mid-sentence.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Overlap characters between consecutive chunks
    ///
    /// The tail of each chunk is carried into the head of the next so
    /// retrieval keeps context across chunk boundaries.
    /// Must satisfy `overlap < chunk_size`.
    #[serde(default = "default_overlap")]
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            overlap: default_overlap(),
        }
    }
}

impl crate::validation::Validate for ChunkingConfig {
    fn validate(&self) -> crate::error::Result<()> {
        use crate::error::ConfigError;
        use crate::validation::validate_positive;

        validate_positive("chunking.chunk_size", self.chunk_size, 0)?;

        if self.overlap >= self.chunk_size {
            return Err(ConfigError::ValidationError {
                field: "chunking.overlap".to_string(),
                message: format!(
                    "overlap ({}) must be < chunk_size ({})",
                    self.overlap, self.chunk_size
                ),
            });
        }

        Ok(())
    }
}

fn default_chunk_size() -> usize {
    1000
}

fn default_overlap() -> usize {
    200
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::Validate;

    #[test]
    fn test_default_config_is_valid() {
        let config = ChunkingConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.chunk_size, 1000);
        assert_eq!(config.overlap, 200);
    }

    #[test]
    fn test_overlap_equal_to_chunk_size_invalid() {
        let config = ChunkingConfig {
            chunk_size: 100,
            overlap: 100,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overlap_larger_than_chunk_size_invalid() {
        let config = ChunkingConfig {
            chunk_size: 100,
            overlap: 250,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_overlap_valid() {
        let config = ChunkingConfig {
            chunk_size: 100,
            overlap: 0,
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_chunk_size_invalid() {
        let config = ChunkingConfig {
            chunk_size: 0,
            overlap: 0,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_serialize_deserialize() {
        let config = ChunkingConfig::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let deserialized: ChunkingConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(config, deserialized);
    }
}
