//! ado-mcp server
//!
//! Wires configuration, the Azure DevOps client and the tool services into
//! an MCP server speaking over stdio.

pub mod cli;
pub mod context;
pub mod error;
pub mod server;
pub mod telemetry;

use std::sync::Arc;

use rmcp::{ServiceExt, transport::stdio};
use tracing::info;

pub use cli::Cli;
pub use context::AppContext;
pub use error::{Result, ServerError};
pub use server::AdoMcpServer;

/// Serves the tools over stdio until the client disconnects.
///
/// # Errors
///
/// Returns an error if the connection check fails or the MCP session cannot
/// be established.
pub async fn run(context: AppContext, check_connection: bool) -> Result<()> {
    if check_connection {
        context.verify_connection().await?;
    }

    info!(
        organization = %context.config().organization,
        api_version = %context.config().api_version,
        "Serving Azure DevOps tools over stdio"
    );

    let service = AdoMcpServer::new(Arc::new(context))
        .serve(stdio())
        .await
        .map_err(|e| ServerError::Mcp(e.to_string()))?;

    let reason = service
        .waiting()
        .await
        .map_err(|e| ServerError::Mcp(e.to_string()))?;

    info!(?reason, "MCP session ended");
    Ok(())
}
