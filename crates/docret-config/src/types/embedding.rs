//! Embedding provider configuration

use serde::{Deserialize, Serialize};

/// Embedding provider configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EmbeddingConfig {
    /// Embedding backend to use
    #[serde(default)]
    pub backend: EmbeddingBackend,

    /// Model name for the selected backend
    ///
    /// Examples:
    /// - OpenAI: "text-embedding-ada-002", "text-embedding-3-small"
    /// - Ollama: "nomic-embed-text", "mxbai-embed-large"
    #[serde(default = "default_model_name")]
    pub model_name: String,

    /// Maximum texts per backend request
    ///
    /// Remote APIs cap batch sizes; larger inputs are split into
    /// sub-batches of this size. Local backends ignore it.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

/// Embedding backend options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    /// OpenAI API (requires OPENAI_API_KEY)
    OpenAi,

    /// Local Ollama server
    Ollama,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            backend: EmbeddingBackend::Ollama,
            model_name: default_model_name(),
            batch_size: default_batch_size(),
        }
    }
}

impl Default for EmbeddingBackend {
    fn default() -> Self {
        EmbeddingBackend::Ollama
    }
}

impl crate::validation::Validate for EmbeddingConfig {
    fn validate(&self) -> crate::error::Result<()> {
        use crate::error::ConfigError;
        use crate::validation::validate_positive;

        if self.model_name.is_empty() {
            return Err(ConfigError::ValidationError {
                field: "embedding.model_name".to_string(),
                message: "Model name cannot be empty".to_string(),
            });
        }

        validate_positive("embedding.batch_size", self.batch_size, 0)?;

        if self.backend == EmbeddingBackend::OpenAi && std::env::var("OPENAI_API_KEY").is_err() {
            eprintln!("Warning: embedding.backend is 'openai' but OPENAI_API_KEY is not set");
        }

        Ok(())
    }
}

fn default_model_name() -> String {
    "nomic-embed-text".to_string()
}

fn default_batch_size() -> usize {
    100
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::Validate;

    #[test]
    fn test_default_is_valid() {
        let config = EmbeddingConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_model_name_invalid() {
        let config = EmbeddingConfig {
            model_name: String::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_batch_size_invalid() {
        let config = EmbeddingConfig {
            batch_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_backend_serialization() {
        assert_eq!(
            serde_yaml::to_string(&EmbeddingBackend::OpenAi).unwrap().trim(),
            "openai"
        );
        assert_eq!(
            serde_yaml::to_string(&EmbeddingBackend::Ollama).unwrap().trim(),
            "ollama"
        );
    }
}
