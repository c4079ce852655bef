//! Error types for configuration loading.

use thiserror::Error;

/// Errors raised while loading or validating [`Config`](crate::Config).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is absent or empty.
    #[error("{0} environment variable is required")]
    MissingVar(String),

    /// A setting is present but unusable.
    #[error("{0}")]
    Invalid(String),

    /// The configuration file could not be read.
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid TOML for this schema.
    #[error("Failed to parse config file: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result type alias using `ConfigError`.
pub type Result<T> = std::result::Result<T, ConfigError>;
