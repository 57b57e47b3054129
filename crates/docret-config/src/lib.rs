//! Configuration management for docret
//!
//! Provides typed configuration with validation, sensible defaults and
//! multi-format file loading (YAML, TOML).
//!
//! # Example
//!
//! ```no_run
//! use docret_config::ConfigBuilder;
//!
//! let config = ConfigBuilder::new()
//!     .with_file(".docret.toml")
//!     .build()?;
//! assert!(config.chunking.overlap < config.chunking.chunk_size);
//! # Ok::<(), docret_config::ConfigError>(())
//! ```

pub mod error;
pub mod loader;
pub mod types;
pub mod validation;

pub use error::{ConfigError, Result};
pub use loader::ConfigBuilder;
pub use types::*;

pub use validation::Validate;
