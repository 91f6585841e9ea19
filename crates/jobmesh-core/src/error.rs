//! Core error types for jobmesh.
//!
//! Subsystem crates define their own richer error enums. The core only fails
//! on malformed shared values and on configuration.

use thiserror::Error;

/// Errors raised by the core crate.
#[derive(Error, Debug)]
pub enum JobmeshError {
    /// Configuration could not be loaded or is invalid
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A shared value (source ID, listing field) failed validation
    #[error("validation error: {0}")]
    Validation(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to determine config directory path
    #[error("could not determine config directory (XDG base directories not available)")]
    NoConfigDir,

    /// Failed to parse TOML
    #[error("failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Failed to serialize config
    #[error("failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// I/O error reading/writing config
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration value
    #[error("invalid config value for {field}: {reason}")]
    InvalidValue {
        /// Field name
        field: String,
        /// Reason for invalidity
        reason: String,
    },
}

/// Result type alias using `JobmeshError`.
pub type Result<T> = std::result::Result<T, JobmeshError>;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = JobmeshError::Validation("apply_url is required".to_string());
        assert_eq!(err.to_string(), "validation error: apply_url is required");

        let err = ConfigError::InvalidValue {
            field: "aggregation.result_cap".to_string(),
            reason: "must be greater than zero".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid config value for aggregation.result_cap: must be greater than zero"
        );
    }

    #[test]
    fn test_error_from_config() {
        let config_err = ConfigError::NoConfigDir;
        let err: JobmeshError = config_err.into();
        assert!(matches!(err, JobmeshError::Config(_)));
    }
}
