//! Variable group listing and details.

use std::sync::Arc;

use serde_json::{Map, Value, json};

use ado_mcp_client::{DevOpsApi, Result};
use ado_mcp_common::{User, VariableGroup};
use ado_mcp_redact::{SharedLogger, create_correlation_id, into_context};

use crate::LOG_CHANNEL;
use crate::projects::ProjectResolver;
use crate::response::ToolResponse;

/// Placeholder shown instead of a secret variable's value.
pub const SECRET_MASK: &str = "[SECRET]";

const LIST_FAILED: &str = "Failed to list variable groups";
const DETAILS_FAILED: &str = "Failed to get variable group details";

/// Builds the payloads of the `list_variable_groups` and
/// `get_variable_group` tools.
pub struct VariableGroupService {
    api: Arc<dyn DevOpsApi>,
    projects: Arc<ProjectResolver>,
    logger: Arc<SharedLogger>,
}

impl VariableGroupService {
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

    /// Lists the variable groups of a project as summaries.
    pub async fn list_variable_groups(
        &self,
        project: &str,
        group_name: Option<&str>,
    ) -> ToolResponse {
        let group_name = group_name.filter(|n| !n.trim().is_empty());
        let correlation_id = create_correlation_id();
        let context = into_context(json!({"project": project, "group_name": group_name}));
        self.logger
            .log_info("Listing variable groups", Some(&correlation_id), &context);

        match self.try_list(project, group_name).await {
            Ok(response) => response,
            Err(e) => {
                self.logger.log_error(
                    "Error listing variable groups",
                    &e,
                    Some(&correlation_id),
                    &context,
                );
                ToolResponse::failure(e.to_string(), LIST_FAILED).with_data(json!([]))
            }
        }
    }

    /// Describes one variable group, masking secret values.
    pub async fn get_variable_group_details(&self, project: &str, group_id: i64) -> ToolResponse {
        let correlation_id = create_correlation_id();
        let context = into_context(json!({"project": project, "group_id": group_id}));
        self.logger
            .log_info("Getting variable group details", Some(&correlation_id), &context);

        match self.try_details(project, group_id).await {
            Ok(response) => response,
            Err(e) => {
                self.logger.log_error(
                    "Error getting variable group details",
                    &e,
                    Some(&correlation_id),
                    &context,
                );
                ToolResponse::failure(e.to_string(), DETAILS_FAILED)
            }
        }
    }

    async fn try_list(&self, project: &str, group_name: Option<&str>) -> Result<ToolResponse> {
        let Some(found) = self.projects.resolve(project).await? else {
            return Ok(
                ToolResponse::failure(format!("Project '{project}' not found"), LIST_FAILED)
                    .with_data(json!([])),
            );
        };

        let groups = self.api.get_variable_groups(&found.id, group_name).await?;

        let suffix = group_name
            .map(|name| format!(" with name '{name}'"))
            .unwrap_or_default();

        if groups.is_empty() {
            return Ok(ToolResponse::list(
                Vec::new(),
                format!("No variable groups found in project '{project}'{suffix}"),
            ));
        }

        let summaries: Vec<Value> = groups.iter().map(summarize).collect();
        let message = format!(
            "Found {} variable group(s) in project '{project}'{suffix}",
            summaries.len()
        );

        Ok(ToolResponse::list(summaries, message))
    }

    async fn try_details(&self, project: &str, group_id: i64) -> Result<ToolResponse> {
        let Some(found) = self.projects.resolve(project).await? else {
            return Ok(ToolResponse::failure(
                format!("Project '{project}' not found"),
                DETAILS_FAILED,
            ));
        };

        let Some(group) = self.api.get_variable_group(&found.id, group_id).await? else {
            return Ok(ToolResponse::failure(
                format!("Variable group with ID {group_id} not found"),
                DETAILS_FAILED,
            ));
        };

        let message = format!("Variable group '{}' details", group.name);
        Ok(ToolResponse::item(describe(&group, project), message))
    }
}

fn summarize(group: &VariableGroup) -> Value {
    json!({
        "id": group.id,
        "name": group.name,
        "description": group.description,
        "type": group.group_type.as_str(),
        "variable_count": group.variables.len(),
        "secret_count": group.secret_count(),
        "created_by": group.created_by.display_name,
        "created_on": group.created_on.to_rfc3339(),
        "modified_by": group.modified_by.display_name,
        "modified_on": group.modified_on.to_rfc3339(),
    })
}

fn describe(group: &VariableGroup, requested_project: &str) -> Value {
    let variables: Map<String, Value> = group
        .variables
        .iter()
        .map(|(name, variable)| {
            let value = if variable.is_secret {
                Value::from(SECRET_MASK)
            } else {
                variable.value.clone().map_or(Value::Null, Value::String)
            };
            (
                name.clone(),
                json!({"value": value, "is_secret": variable.is_secret}),
            )
        })
        .collect();

    json!({
        "id": group.id,
        "name": group.name,
        "description": group.description,
        "type": group.group_type.as_str(),
        "variables": variables,
        "created_by": user_summary(&group.created_by),
        "created_on": group.created_on.to_rfc3339(),
        "modified_by": user_summary(&group.modified_by),
        "modified_on": group.modified_on.to_rfc3339(),
        "project_id": group.project_id,
        "project_name": group.project_name.as_deref().unwrap_or(requested_project),
    })
}

pub(crate) fn user_summary(user: &User) -> Value {
    json!({
        "id": user.id,
        "display_name": user.display_name,
        "unique_name": user.unique_name,
    })
}
