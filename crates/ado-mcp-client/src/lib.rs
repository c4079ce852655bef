//! # ado-mcp-client
//!
//! Read access to the Azure DevOps REST API.
//!
//! [`DevOpsApi`] is the seam the service layer programs against;
//! [`AzureDevOpsClient`] implements it over HTTP with Basic authentication,
//! exponential-backoff retries and redacted, correlation-tagged request
//! logging.
//!
//! ## Example
//!
//! ```no_run
//! use ado_mcp_client::{AzureDevOpsClient, DevOpsApi};
//! use ado_mcp_common::Config;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = AzureDevOpsClient::new(Config::from_env()?)?;
//!
//! for group in client.get_variable_groups("web", None).await? {
//!     println!("{} ({} variables)", group.name, group.variables.len());
//! }
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use log::{error, info};

use ado_mcp_common::{Project, ServiceConnection, VariableGroup};

/// HTTP implementation of [`DevOpsApi`].
pub mod azure;
/// Error types for API calls.
pub mod error;

pub use azure::AzureDevOpsClient;
pub use error::{ClientError, Result};

/// Read operations against one Azure DevOps organization.
///
/// Single-resource lookups return `Ok(None)` when the resource does not
/// exist; every other failure is an error.
#[async_trait]
pub trait DevOpsApi: Send + Sync {
    /// Lists every project in the organization.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be decoded.
    async fn get_projects(&self) -> Result<Vec<Project>>;

    /// Looks up a project by id or name.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails for any reason other than the
    /// project not existing.
    async fn get_project(&self, project: &str) -> Result<Option<Project>>;

    /// Lists the variable groups of a project, optionally filtered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be decoded.
    async fn get_variable_groups(
        &self,
        project: &str,
        group_name: Option<&str>,
    ) -> Result<Vec<VariableGroup>>;

    /// Fetches one variable group.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails for any reason other than the
    /// group not existing.
    async fn get_variable_group(
        &self,
        project: &str,
        group_id: i64,
    ) -> Result<Option<VariableGroup>>;

    /// Lists the service connections of a project.
    ///
    /// `connection_type` is passed to the API as-is; `include_shared` adds
    /// connections shared from other projects.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be decoded.
    async fn get_service_connections(
        &self,
        project: &str,
        connection_type: Option<&str>,
        include_shared: bool,
    ) -> Result<Vec<ServiceConnection>>;

    /// Fetches one service connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails for any reason other than the
    /// connection not existing.
    async fn get_service_connection(
        &self,
        project: &str,
        connection_id: &str,
    ) -> Result<Option<ServiceConnection>>;

    /// Checks that the organization is reachable with the configured
    /// credentials.
    async fn test_connection(&self) -> bool {
        match self.get_projects().await {
            Ok(projects) => {
                info!(
                    "Successfully connected to Azure DevOps. Found {} projects.",
                    projects.len()
                );
                true
            }
            Err(e) => {
                error!("Failed to connect to Azure DevOps: {e}");
                false
            }
        }
    }
}
