//! Retrieval and context assembly configuration

use serde::{Deserialize, Serialize};

/// Configuration for query-time retrieval
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievalConfig {
    /// Number of chunks to retrieve per query
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Minimum similarity score for a chunk to be returned
    ///
    /// Scores are in [0, 1]; chunks below the threshold are dropped.
    #[serde(default = "default_min_score")]
    pub min_score: f32,

    /// Maximum characters of chunk content assembled into one context
    #[serde(default = "default_max_context_chars")]
    pub max_context_chars: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            min_score: default_min_score(),
            max_context_chars: default_max_context_chars(),
        }
    }
}

impl crate::validation::Validate for RetrievalConfig {
    fn validate(&self) -> crate::error::Result<()> {
        use crate::validation::{validate_positive, validate_range};

        validate_positive("retrieval.top_k", self.top_k, 0)?;
        validate_range("retrieval.min_score", self.min_score, 0.0, 1.0)?;
        validate_positive("retrieval.max_context_chars", self.max_context_chars, 0)?;

        Ok(())
    }
}

fn default_top_k() -> usize {
    5
}

fn default_min_score() -> f32 {
    0.5
}

fn default_max_context_chars() -> usize {
    4000
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::Validate;

    #[test]
    fn test_default_config_is_valid() {
        let config = RetrievalConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.top_k, 5);
        assert_eq!(config.max_context_chars, 4000);
    }

    #[test]
    fn test_min_score_out_of_range_invalid() {
        let config = RetrievalConfig {
            min_score: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_top_k_invalid() {
        let config = RetrievalConfig {
            top_k: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
