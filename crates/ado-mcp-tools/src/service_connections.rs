//! Service connection listing and details.
//!
//! Connection details expose the authorization parameters and the data
//! block, both of which routinely hold credentials. Values are masked in two
//! passes: any key containing `password`, `secret` or `key` is replaced
//! outright, then the rest goes through the redaction engine so that
//! credential-shaped keys and values it recognises are masked as well.

use std::sync::Arc;

use serde_json::{Map, Value, json};

use ado_mcp_client::{DevOpsApi, Result};
use ado_mcp_common::ServiceConnection;
use ado_mcp_redact::{REDACTED, SharedLogger, create_correlation_id, into_context, redact_map};

use crate::LOG_CHANNEL;
use crate::projects::ProjectResolver;
use crate::response::ToolResponse;
use crate::variable_groups::user_summary;

const MASKED_KEY_TERMS: &[&str] = &["password", "secret", "key"];

const LIST_FAILED: &str = "Failed to list service connections";
const DETAILS_FAILED: &str = "Failed to get service connection details";

/// Builds the payloads of the `list_service_connections` and
/// `get_service_connection` tools.
pub struct ServiceConnectionService {
    api: Arc<dyn DevOpsApi>,
    projects: Arc<ProjectResolver>,
    logger: Arc<SharedLogger>,
}

impl ServiceConnectionService {
    #[must_use]
    pub fn new(api: Arc<dyn DevOpsApi>, projects: Arc<ProjectResolver>) -> Self {
        Self {
            api,
            projects,
            logger: Arc::new(SharedLogger::shared(LOG_CHANNEL)),
        }
    }

    #[must_use]
    pub fn with_logger(mut self, logger: SharedLogger) -> Self {
        self.logger = Arc::new(logger);
        self
    }

    /// Lists the service connections of a project as summaries.
    ///
    /// The type filter is applied locally and ignores case.
    pub async fn list_service_connections(
        &self,
        project: &str,
        connection_type: Option<&str>,
        include_shared: bool,
    ) -> ToolResponse {
        let connection_type = connection_type.filter(|t| !t.trim().is_empty());
        let correlation_id = create_correlation_id();
        let context = into_context(json!({
            "project": project,
            "connection_type": connection_type,
            "include_shared": include_shared,
        }));
        self.logger
            .log_info("Listing service connections", Some(&correlation_id), &context);

        match self
            .try_list(project, connection_type, include_shared)
            .await
        {
            Ok(response) => response,
            Err(e) => {
                self.logger.log_error(
                    "Error listing service connections",
                    &e,
                    Some(&correlation_id),
                    &context,
                );
                ToolResponse::failure(e.to_string(), LIST_FAILED).with_data(json!([]))
            }
        }
    }

    /// Describes one service connection with its credentials masked.
    pub async fn get_service_connection_details(
        &self,
        project: &str,
        connection_id: &str,
    ) -> ToolResponse {
        let correlation_id = create_correlation_id();
        let context = into_context(json!({"project": project, "connection_id": connection_id}));
        self.logger.log_info(
            "Getting service connection details",
            Some(&correlation_id),
            &context,
        );

        match self.try_details(project, connection_id).await {
            Ok(response) => response,
            Err(e) => {
                self.logger.log_error(
                    &format!("Error getting service connection {connection_id}"),
                    &e,
                    Some(&correlation_id),
                    &context,
                );
                ToolResponse::failure(e.to_string(), DETAILS_FAILED)
            }
        }
    }

    async fn try_list(
        &self,
        project: &str,
        connection_type: Option<&str>,
        include_shared: bool,
    ) -> Result<ToolResponse> {
        let Some(found) = self.projects.resolve(project).await? else {
            return Ok(
                ToolResponse::failure(format!("Project '{project}' not found"), LIST_FAILED)
                    .with_data(json!([])),
            );
        };

        let mut connections = self
            .api
            .get_service_connections(&found.id, None, include_shared)
            .await?;

        if let Some(wanted) = connection_type {
            connections.retain(|c| c.connection_type.matches(wanted));
        }

        let suffix = connection_type
            .map(|t| format!(" of type '{t}'"))
            .unwrap_or_default();

        if connections.is_empty() {
            return Ok(ToolResponse::list(
                Vec::new(),
                format!("No service connections found in project '{project}'{suffix}"),
            ));
        }

        let summaries: Vec<Value> = connections.iter().map(summarize).collect();
        let message = format!(
            "Found {} service connection(s) in project '{project}'{suffix}",
            summaries.len()
        );

        Ok(ToolResponse::list(summaries, message))
    }

    async fn try_details(&self, project: &str, connection_id: &str) -> Result<ToolResponse> {
        let Some(found) = self.projects.resolve(project).await? else {
            return Ok(ToolResponse::failure(
                format!("Project '{project}' not found"),
                DETAILS_FAILED,
            ));
        };

        let Some(connection) = self
            .api
            .get_service_connection(&found.id, connection_id)
            .await?
        else {
            return Ok(ToolResponse::failure(
                format!("Service connection with ID {connection_id} not found"),
                DETAILS_FAILED,
            ));
        };

        let message = format!("Service connection '{}' details", connection.name);
        Ok(ToolResponse::item(describe(&connection, project), message))
    }
}

fn summarize(connection: &ServiceConnection) -> Value {
    let created_by = connection
        .created_by
        .as_ref()
        .map_or("Unknown", |user| user.display_name.as_str());

    json!({
        "id": connection.id,
        "name": connection.name,
        "type": connection.connection_type.as_str(),
        "url": connection.url,
        "description": connection.description,
        "is_shared": connection.is_shared,
        "is_ready": connection.is_ready,
        "owner": connection.owner,
        "created_by": created_by,
    })
}

fn describe(connection: &ServiceConnection, requested_project: &str) -> Value {
    json!({
        "id": connection.id,
        "name": connection.name,
        "type": connection.connection_type.as_str(),
        "url": connection.url,
        "description": connection.description,
        "is_shared": connection.is_shared,
        "is_ready": connection.is_ready,
        "owner": connection.owner,
        "created_by": connection.created_by.as_ref().map(user_summary),
        "project_id": connection.project_id,
        "project_name": connection.project_name.as_deref().unwrap_or(requested_project),
        "authorization": {
            "scheme": connection.authorization.scheme,
            "parameters": mask_values(&connection.authorization.parameters),
        },
        "data": mask_values(&connection.data),
    })
}

/// Masks credential entries of a connection's parameters or data.
#[must_use]
pub fn mask_values(values: &Map<String, Value>) -> Map<String, Value> {
    let masked: Map<String, Value> = values
        .iter()
        .map(|(key, value)| {
            let lower = key.to_lowercase();
            if MASKED_KEY_TERMS.iter().any(|term| lower.contains(term)) {
                (key.clone(), Value::from(REDACTED))
            } else {
                (key.clone(), value.clone())
            }
        })
        .collect();

    redact_map(&masked, REDACTED, true)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::testing::{MockDevOpsApi, connection, project};
    use ado_mcp_common::ServiceConnectionType;

    fn service(api: MockDevOpsApi) -> ServiceConnectionService {
        let api: Arc<dyn DevOpsApi> = Arc::new(api);
        let projects = Arc::new(ProjectResolver::new(Arc::clone(&api)));
        ServiceConnectionService::new(api, projects)
    }

    fn populated() -> MockDevOpsApi {
        let mut shared = connection("conn-3", "shared-registry", "dockerregistry");
        shared.is_shared = true;
        shared.created_by = None;

        MockDevOpsApi::new()
            .with_project(project("p1", "web"))
            .with_connection(connection("conn-1", "prod-azure", "azurerm"))
            .with_connection(connection("conn-2", "github-main", "github"))
            .with_connection(shared)
    }

    #[tokio::test]
    async fn test_list_project_not_found() {
        let response = service(MockDevOpsApi::new())
            .list_service_connections("ghost", None, true)
            .await;

        assert!(!response.success);
        assert_eq!(response.error.as_deref(), Some("Project 'ghost' not found"));
        assert_eq!(response.message.as_deref(), Some(LIST_FAILED));
    }

    #[tokio::test]
    async fn test_list_all() {
        let response = service(populated())
            .list_service_connections("web", None, true)
            .await;

        assert!(response.success);
        assert_eq!(response.count, Some(3));
        assert_eq!(
            response.message.as_deref(),
            Some("Found 3 service connection(s) in project 'web'")
        );

        let data = response.data.unwrap();
        assert_eq!(
            data[0],
            json!({
                "id": "conn-1",
                "name": "prod-azure",
                "type": "azurerm",
                "url": "https://management.azure.com/",
                "description": "prod-azure connection",
                "is_shared": false,
                "is_ready": true,
                "owner": "Library",
                "created_by": "Alice Admin",
            })
        );
        assert_eq!(data[2]["created_by"], "Unknown");
    }

    #[tokio::test]
    async fn test_list_filters_type_ignoring_case() {
        let response = service(populated())
            .list_service_connections("web", Some("AzureRM"), true)
            .await;

        assert_eq!(response.count, Some(1));
        assert_eq!(response.data.unwrap()[0]["id"], "conn-1");
        assert_eq!(
            response.message.as_deref(),
            Some("Found 1 service connection(s) in project 'web' of type 'AzureRM'")
        );
    }

    #[tokio::test]
    async fn test_list_excluding_shared() {
        let response = service(populated())
            .list_service_connections("web", None, false)
            .await;
        assert_eq!(response.count, Some(2));
    }

    #[tokio::test]
    async fn test_list_empty_with_type() {
        let response = service(populated())
            .list_service_connections("web", Some("kubernetes"), true)
            .await;

        assert!(response.success);
        assert_eq!(response.count, Some(0));
        assert_eq!(
            response.message.as_deref(),
            Some("No service connections found in project 'web' of type 'kubernetes'")
        );
    }

    #[tokio::test]
    async fn test_details_are_masked() {
        let response = service(populated())
            .get_service_connection_details("web", "conn-1")
            .await;

        assert!(response.success);
        assert_eq!(
            response.message.as_deref(),
            Some("Service connection 'prod-azure' details")
        );

        let data = response.data.unwrap();
        let parameters = &data["authorization"]["parameters"];
        assert_eq!(data["authorization"]["scheme"], "ServicePrincipal");
        assert_eq!(parameters["serviceprincipalkey"], REDACTED);
        assert_eq!(parameters["authenticationType"], REDACTED);
        assert_eq!(parameters["scope"], "subscription");

        assert_eq!(data["data"]["appObjectSecret"], REDACTED);
        assert_eq!(data["data"]["subscriptionId"], REDACTED);
        assert_eq!(data["data"]["environment"], "AzureCloud");
        assert_eq!(data["data"]["subscriptionName"], "Production");

        assert_eq!(data["created_by"]["display_name"], "Alice Admin");
        assert_eq!(data["project_name"], "web");

        let rendered = serde_json::to_string(&data).unwrap();
        assert!(!rendered.contains("super-secret-value"));
    }

    #[tokio::test]
    async fn test_details_not_found() {
        let response = service(populated())
            .get_service_connection_details("web", "nope")
            .await;

        assert!(!response.success);
        assert_eq!(
            response.error.as_deref(),
            Some("Service connection with ID nope not found")
        );
        assert_eq!(response.message.as_deref(), Some(DETAILS_FAILED));
    }

    #[tokio::test]
    async fn test_details_api_failure() {
        let response = service(populated().failing_with(401))
            .get_service_connection_details("web", "conn-1")
            .await;

        assert!(!response.success);
        assert!(response.error.unwrap().contains("status 401"));
    }

    #[test]
    fn test_mask_values_handles_nested_data() {
        let values = into_context(json!({
            "Password": "p",
            "nested": {"token": "t", "region": "westeurope"},
            "publicKey": "ssh-rsa AAAA",
        }));

        let masked = mask_values(&values);
        assert_eq!(masked["Password"], REDACTED);
        assert_eq!(masked["publicKey"], REDACTED);
        assert_eq!(masked["nested"], json!({"token": REDACTED, "region": "westeurope"}));
    }

    #[test]
    fn test_unknown_type_survives_summary() {
        let mut other = connection("conn-9", "sonar", "azurerm");
        other.connection_type = ServiceConnectionType::Other("sonarqube".to_string());
        assert_eq!(summarize(&other)["type"], "sonarqube");
    }
}
