//! Error types for the ado-mcp server.

use thiserror::Error;

/// Errors that can stop the server from starting or serving.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Configuration could not be loaded or is invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ado_mcp_common::ConfigError),

    /// The Azure DevOps client could not be built or reached.
    #[error("Client error: {0}")]
    Client(#[from] ado_mcp_client::ClientError),

    /// The startup connection check did not succeed.
    #[error("Failed to connect to Azure DevOps organization '{0}'")]
    Connection(String),

    /// I/O error on the stdio transport.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// MCP session setup or shutdown failed.
    #[error("MCP error: {0}")]
    Mcp(String),
}

/// Result type alias using `ServerError`.
pub type Result<T> = std::result::Result<T, ServerError>;
