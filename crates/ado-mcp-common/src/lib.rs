//! # ado-mcp-common
//!
//! Shared configuration and Azure DevOps resource records for the ado-mcp
//! server.
//!
//! - [`Config`] loads settings from the environment or a TOML file and
//!   keeps the personal access token in a [`secrecy::SecretString`]
//! - [`models`] maps REST payloads into typed records
//!
//! ## Example
//!
//! ```
//! use ado_mcp_common::{Config, LogFormat};
//!
//! let config = Config::from_lookup(|key| match key {
//!     "AZURE_DEVOPS_ORGANIZATION" => Some("contoso".to_string()),
//!     "AZURE_DEVOPS_PAT" => Some("my-pat".to_string()),
//!     "LOG_FORMAT" => Some("text".to_string()),
//!     _ => None,
//! })
//! .unwrap();
//!
//! assert_eq!(config.api_url(), "https://dev.azure.com/contoso/_apis");
//! assert_eq!(config.log_format, LogFormat::Text);
//! ```

/// Configuration loading and validation.
pub mod config;
/// Configuration errors.
pub mod error;
/// Azure DevOps resource records.
pub mod models;

pub use config::{Config, LogFormat, RetryConfig};
pub use error::ConfigError;
pub use models::{
    ApiList, Project, ServiceConnection, ServiceConnectionType, ServiceEndpointAuthorization,
    User, VariableGroup, VariableGroupType, VariableValue,
};
