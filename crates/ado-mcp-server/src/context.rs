//! Process-wide state built once at startup.

use std::sync::Arc;

use tracing::{error, info};

use ado_mcp_client::{AzureDevOpsClient, DevOpsApi};
use ado_mcp_common::Config;
use ado_mcp_tools::{ServiceConnectionService, ToolServices, VariableGroupService};

use crate::error::{Result, ServerError};

/// Configuration, API client and tool services shared by every tool call.
pub struct AppContext {
    config: Arc<Config>,
    api: Arc<dyn DevOpsApi>,
    services: ToolServices,
}

impl AppContext {
    /// Builds the context around the real Azure DevOps client.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: Config) -> Result<Self> {
        let client = AzureDevOpsClient::new(config.clone())?;
        Ok(Self::with_api(config, Arc::new(client)))
    }

    /// Builds the context around any API implementation.
    #[must_use]
    pub fn with_api(config: Config, api: Arc<dyn DevOpsApi>) -> Self {
        let services = ToolServices::new(Arc::clone(&api), &config);
        Self {
            config: Arc::new(config),
            api,
            services,
        }
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub const fn variable_groups(&self) -> &VariableGroupService {
        &self.services.variable_groups
    }

    #[must_use]
    pub const fn service_connections(&self) -> &ServiceConnectionService {
        &self.services.service_connections
    }

    /// Fails unless the organization answers a project listing.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Connection`] when the check fails.
    pub async fn verify_connection(&self) -> Result<()> {
        if self.api.test_connection().await {
            info!(organization = %self.config.organization, "Connected to Azure DevOps");
            Ok(())
        } else {
            error!(organization = %self.config.organization, "Azure DevOps connection check failed");
            Err(ServerError::Connection(self.config.organization.clone()))
        }
    }
}
