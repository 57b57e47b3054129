//! Configuration loading from files and explicit overrides
//!
//! Supports layered configuration with proper precedence:
//! defaults < file < explicit overrides

use crate::error::ConfigError;
use crate::types::*;
use crate::{Result, Validate};
use std::fs;
use std::path::{Path, PathBuf};

/// Format for configuration files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML format (.yml, .yaml)
    Yaml,
    /// TOML format (.toml)
    Toml,
}

/// Configuration source for layered loading
#[derive(Debug, Clone)]
pub enum ConfigSource {
    /// Load from a file
    File(PathBuf),
    /// Explicit config object (for programmatic use)
    Explicit(Config),
}

/// Builder for loading and merging configurations
///
/// # Example
///
/// ```no_run
/// use docret_config::ConfigBuilder;
///
/// let config = ConfigBuilder::new()
///     .with_file(".docret.toml")
///     .build()?;
/// # Ok::<(), docret_config::ConfigError>(())
/// ```
pub struct ConfigBuilder {
    sources: Vec<ConfigSource>,
}

impl ConfigBuilder {
    /// Create a new config builder starting with defaults
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    /// Add a file source
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.sources
            .push(ConfigSource::File(path.as_ref().to_path_buf()));
        self
    }

    /// Add explicit config overlay (for programmatic use)
    pub fn with_config(mut self, config: Config) -> Self {
        self.sources.push(ConfigSource::Explicit(config));
        self
    }

    /// Build and validate the final configuration
    ///
    /// Merges all sources in order, with later sources taking precedence.
    pub fn build(self) -> Result<Config> {
        let mut config = Config::default();

        for source in self.sources {
            match source {
                ConfigSource::File(path) => {
                    let file_config = load_from_file(&path)?;
                    config = merge(config, file_config);
                }
                ConfigSource::Explicit(explicit_config) => {
                    config = merge(config, explicit_config);
                }
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Load from a single file (convenience method)
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Config> {
        Self::new().with_file(path).build()
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Load configuration from a file
pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let format = detect_format(path)?;

    let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let path_str = path.display().to_string();
    let config = match format {
        ConfigFormat::Yaml => {
            serde_yaml::from_str(&content).map_err(|e| ConfigError::YamlError {
                path: path_str,
                message: e.to_string(),
            })?
        }
        ConfigFormat::Toml => toml::from_str(&content).map_err(|e| ConfigError::TomlError {
            path: path_str,
            message: e.to_string(),
        })?,
    };

    Ok(config)
}

/// Detect configuration format from file extension
fn detect_format(path: &Path) -> Result<ConfigFormat> {
    match path.extension().and_then(|s| s.to_str()) {
        Some("yml") | Some("yaml") => Ok(ConfigFormat::Yaml),
        Some("toml") => Ok(ConfigFormat::Toml),
        _ => Err(ConfigError::UnknownFormat {
            path: path.to_path_buf(),
        }),
    }
}

/// Merge two configurations, with `overlay` taking precedence
///
/// Performs a deep merge where non-default values from `overlay` override
/// values in `base`.
pub fn merge(mut base: Config, overlay: Config) -> Config {
    base.storage = merge_storage(base.storage, overlay.storage);
    base.chunking = merge_chunking(base.chunking, overlay.chunking);
    base.embedding = merge_embedding(base.embedding, overlay.embedding);
    base.index = merge_index(base.index, overlay.index);
    base.retrieval = merge_retrieval(base.retrieval, overlay.retrieval);

    base
}

fn merge_storage(base: StorageConfig, overlay: StorageConfig) -> StorageConfig {
    let default = StorageConfig::default();
    StorageConfig {
        data_dir: if overlay.data_dir != default.data_dir {
            overlay.data_dir
        } else {
            base.data_dir
        },
    }
}

fn merge_chunking(base: ChunkingConfig, overlay: ChunkingConfig) -> ChunkingConfig {
    let default = ChunkingConfig::default();
    ChunkingConfig {
        chunk_size: if overlay.chunk_size != default.chunk_size {
            overlay.chunk_size
        } else {
            base.chunk_size
        },
        overlap: if overlay.overlap != default.overlap {
            overlay.overlap
        } else {
            base.overlap
        },
    }
}

fn merge_embedding(base: EmbeddingConfig, overlay: EmbeddingConfig) -> EmbeddingConfig {
    let default = EmbeddingConfig::default();
    EmbeddingConfig {
        backend: if overlay.backend != default.backend {
            overlay.backend
        } else {
            base.backend
        },
        model_name: if overlay.model_name != default.model_name {
            overlay.model_name
        } else {
            base.model_name
        },
        batch_size: if overlay.batch_size != default.batch_size {
            overlay.batch_size
        } else {
            base.batch_size
        },
    }
}

fn merge_index(base: IndexConfig, overlay: IndexConfig) -> IndexConfig {
    let default = IndexConfig::default();
    IndexConfig {
        backend: if overlay.backend != default.backend {
            overlay.backend
        } else {
            base.backend
        },
    }
}

fn merge_retrieval(base: RetrievalConfig, overlay: RetrievalConfig) -> RetrievalConfig {
    let default = RetrievalConfig::default();
    RetrievalConfig {
        top_k: if overlay.top_k != default.top_k {
            overlay.top_k
        } else {
            base.top_k
        },
        min_score: if (overlay.min_score - default.min_score).abs() > 0.001 {
            overlay.min_score
        } else {
            base.min_score
        },
        max_context_chars: if overlay.max_context_chars != default.max_context_chars {
            overlay.max_context_chars
        } else {
            base.max_context_chars
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_detect_formats() {
        assert_eq!(
            detect_format(&PathBuf::from("config.yml")).unwrap(),
            ConfigFormat::Yaml
        );
        assert_eq!(
            detect_format(&PathBuf::from("config.yaml")).unwrap(),
            ConfigFormat::Yaml
        );
        assert_eq!(
            detect_format(&PathBuf::from("config.toml")).unwrap(),
            ConfigFormat::Toml
        );
        assert!(detect_format(&PathBuf::from("config.ini")).is_err());
    }

    #[test]
    fn test_parse_minimal_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docret.toml");
        let mut file = fs::File::create(&path).unwrap();
        write!(
            file,
            "[chunking]\nchunk_size = 500\n\n[retrieval]\ntop_k = 3\n"
        )
        .unwrap();

        let config = ConfigBuilder::from_file(&path).unwrap();
        assert_eq!(config.chunking.chunk_size, 500);
        assert_eq!(config.chunking.overlap, 200);
        assert_eq!(config.retrieval.top_k, 3);
    }

    #[test]
    fn test_parse_minimal_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docret.yaml");
        let mut file = fs::File::create(&path).unwrap();
        write!(file, "embedding:\n  backend: openai\n  model_name: text-embedding-ada-002\n").unwrap();

        let config = ConfigBuilder::from_file(&path).unwrap();
        assert_eq!(config.embedding.backend, EmbeddingBackend::OpenAi);
        assert_eq!(config.embedding.model_name, "text-embedding-ada-002");
    }

    #[test]
    fn test_missing_file_errors() {
        let result = ConfigBuilder::from_file("/nonexistent/docret.toml");
        assert!(matches!(result, Err(ConfigError::FileNotFound { .. })));
    }

    #[test]
    fn test_invalid_file_fails_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docret.toml");
        let mut file = fs::File::create(&path).unwrap();
        write!(file, "[chunking]\nchunk_size = 100\noverlap = 100\n").unwrap();

        assert!(ConfigBuilder::from_file(&path).is_err());
    }

    #[test]
    fn test_explicit_overlay_wins() {
        let mut overlay = Config::default();
        overlay.retrieval.top_k = 10;

        let config = ConfigBuilder::new().with_config(overlay).build().unwrap();
        assert_eq!(config.retrieval.top_k, 10);
        assert_eq!(config.chunking.chunk_size, 1000);
    }

    #[test]
    fn test_build_without_sources_yields_defaults() {
        let config = ConfigBuilder::new().build().unwrap();
        assert_eq!(config, Config::default());
    }
}
