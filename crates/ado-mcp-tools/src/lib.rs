//! Services behind the ado-mcp tools.
//!
//! Each service resolves the requested project, calls the Azure DevOps API
//! through a [`DevOpsApi`] implementation, and shapes the result into a
//! [`ToolResponse`]. Failures never escape as errors; they are logged with a
//! correlation id and reported as `success: false` payloads.

use std::sync::Arc;

use ado_mcp_client::DevOpsApi;
use ado_mcp_common::Config;

pub mod projects;
pub mod response;
pub mod service_connections;
pub mod variable_groups;

#[cfg(test)]
mod testing;

pub use projects::{ProjectCache, ProjectResolver};
pub use response::ToolResponse;
pub use service_connections::{ServiceConnectionService, mask_values};
pub use variable_groups::{SECRET_MASK, VariableGroupService};

/// Logger channel shared by the tool services.
pub const LOG_CHANNEL: &str = "ado_mcp::tools";

/// Both tool services wired to one API client and one project resolver.
pub struct ToolServices {
    pub variable_groups: VariableGroupService,
    pub service_connections: ServiceConnectionService,
}

impl ToolServices {
    #[must_use]
    pub fn new(api: Arc<dyn DevOpsApi>, config: &Config) -> Self {
        let projects = Arc::new(ProjectResolver::from_config(Arc::clone(&api), config));

        Self {
            variable_groups: VariableGroupService::new(Arc::clone(&api), Arc::clone(&projects)),
            service_connections: ServiceConnectionService::new(api, projects),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::sync::atomic::Ordering;

    use super::*;
    use crate::testing::{MockDevOpsApi, connection, project, variable_group};

    #[tokio::test]
    async fn test_services_share_the_project_cache() {
        let api = Arc::new(
            MockDevOpsApi::new()
                .with_project(project("p1", "web"))
                .with_variable_group(variable_group(1, "shared-settings"))
                .with_connection(connection("conn-1", "prod-azure", "azurerm")),
        );
        let services = ToolServices::new(api.clone(), &Config::new("org", "pat"));

        assert!(services.variable_groups.list_variable_groups("web", None).await.success);
        assert!(
            services
                .service_connections
                .list_service_connections("web", None, true)
                .await
                .success
        );
        assert_eq!(api.project_lookups.load(Ordering::SeqCst), 1);
    }
}
