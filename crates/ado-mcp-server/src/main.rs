//! ado-mcp
//!
//! Model Context Protocol server exposing Azure DevOps variable groups and
//! service connections over stdio.

use clap::Parser;
use tracing::{error, info};

use ado_mcp_server::telemetry::init_tracing;
use ado_mcp_server::{AppContext, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Tracing is not installed yet, so configuration errors go straight out
    let config = match cli.load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return Err(e.into());
        }
    };

    init_tracing(&config);

    info!("Starting ado-mcp server");
    info!(
        organization = %config.organization,
        api_version = %config.api_version,
        log_level = %config.log_level,
        "Loaded configuration"
    );

    let context = match AppContext::new(config) {
        Ok(context) => context,
        Err(e) => {
            error!("Failed to initialize Azure DevOps client: {e}");
            return Err(e.into());
        }
    };

    if let Err(e) = ado_mcp_server::run(context, !cli.skip_connection_check).await {
        error!("Fatal error: {e}");
        return Err(e.into());
    }

    info!("ado-mcp server stopped");
    Ok(())
}
