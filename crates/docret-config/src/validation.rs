//! Validation trait and implementations for configuration types

use crate::error::{ConfigError, Result};

/// Trait for validating configuration values
///
/// Implement this trait for any config type that needs validation beyond
/// type-level checks. Validation should be comprehensive and provide helpful
/// error messages.
pub trait Validate {
    /// Validate the configuration
    ///
    /// Returns `Ok(())` if validation passes, or a `ConfigError` describing
    /// what validation failed and why.
    fn validate(&self) -> Result<()>;
}

/// Helper function to validate integer is above minimum
pub fn validate_positive(field: impl Into<String>, value: usize, min: usize) -> Result<()> {
    if value <= min {
        return Err(ConfigError::InvalidInteger {
            field: field.into(),
            value,
            min,
        });
    }
    Ok(())
}

/// Helper function to validate value is within range
pub fn validate_range(field: impl Into<String>, value: f32, min: f32, max: f32) -> Result<()> {
    if !(min..=max).contains(&value) {
        return Err(ConfigError::OutOfRange {
            field: field.into(),
            value,
            min,
            max,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_valid() {
        assert!(validate_range("test", 0.5, 0.0, 1.0).is_ok());
    }

    #[test]
    fn test_range_invalid() {
        assert!(validate_range("test", 1.5, 0.0, 1.0).is_err());
    }

    #[test]
    fn test_positive_valid() {
        assert!(validate_positive("test", 5, 0).is_ok());
    }

    #[test]
    fn test_positive_invalid() {
        assert!(validate_positive("test", 0, 0).is_err());
    }
}
