//! In-memory `DevOpsApi` used by the service tests.

#![allow(clippy::unwrap_used)]

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::{Value, json};

use ado_mcp_client::{ClientError, DevOpsApi, Result};
use ado_mcp_common::{Project, ServiceConnection, VariableGroup};

#[derive(Default)]
pub struct MockDevOpsApi {
    projects: Vec<Project>,
    variable_groups: Vec<VariableGroup>,
    connections: Vec<ServiceConnection>,
    fail_status: Option<u16>,
    pub project_lookups: AtomicUsize,
}

impl MockDevOpsApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_project(mut self, project: Project) -> Self {
        self.projects.push(project);
        self
    }

    pub fn with_variable_group(mut self, group: VariableGroup) -> Self {
        self.variable_groups.push(group);
        self
    }

    pub fn with_connection(mut self, connection: ServiceConnection) -> Self {
        self.connections.push(connection);
        self
    }

    /// Every call fails with an API error of this status.
    pub const fn failing_with(mut self, status: u16) -> Self {
        self.fail_status = Some(status);
        self
    }

    fn check(&self) -> Result<()> {
        self.fail_status.map_or(Ok(()), |status| {
            Err(ClientError::Api {
                status,
                message: "Service unavailable".to_string(),
                body: None,
            })
        })
    }
}

#[async_trait]
impl DevOpsApi for MockDevOpsApi {
    async fn get_projects(&self) -> Result<Vec<Project>> {
        self.check()?;
        Ok(self.projects.clone())
    }

    async fn get_project(&self, project: &str) -> Result<Option<Project>> {
        self.project_lookups.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self
            .projects
            .iter()
            .find(|p| p.id == project || p.name.eq_ignore_ascii_case(project))
            .cloned())
    }

    async fn get_variable_groups(
        &self,
        _project: &str,
        group_name: Option<&str>,
    ) -> Result<Vec<VariableGroup>> {
        self.check()?;
        Ok(self
            .variable_groups
            .iter()
            .filter(|g| group_name.is_none_or(|name| g.name == name))
            .cloned()
            .collect())
    }

    async fn get_variable_group(
        &self,
        _project: &str,
        group_id: i64,
    ) -> Result<Option<VariableGroup>> {
        self.check()?;
        Ok(self
            .variable_groups
            .iter()
            .find(|g| g.id == group_id)
            .cloned())
    }

    async fn get_service_connections(
        &self,
        _project: &str,
        connection_type: Option<&str>,
        include_shared: bool,
    ) -> Result<Vec<ServiceConnection>> {
        self.check()?;
        Ok(self
            .connections
            .iter()
            .filter(|c| include_shared || !c.is_shared)
            .filter(|c| connection_type.is_none_or(|t| c.connection_type.matches(t)))
            .cloned()
            .collect())
    }

    async fn get_service_connection(
        &self,
        _project: &str,
        connection_id: &str,
    ) -> Result<Option<ServiceConnection>> {
        self.check()?;
        Ok(self
            .connections
            .iter()
            .find(|c| c.id == connection_id)
            .cloned())
    }
}

fn user(name: &str) -> Value {
    json!({
        "id": format!("{}-id", name.to_lowercase().replace(' ', "-")),
        "displayName": name,
        "uniqueName": format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
    })
}

pub fn project(id: &str, name: &str) -> Project {
    serde_json::from_value(json!({
        "id": id,
        "name": name,
        "url": format!("https://dev.azure.com/test-org/_apis/projects/{id}"),
        "state": "wellFormed",
        "visibility": "private",
        "lastUpdateTime": "2024-01-01T00:00:00Z",
    }))
    .unwrap()
}

/// A group with one plain and one secret variable.
pub fn variable_group(id: i64, name: &str) -> VariableGroup {
    serde_json::from_value(json!({
        "id": id,
        "name": name,
        "description": format!("{name} settings"),
        "type": "Vsts",
        "variables": {
            "environment": {"value": "production", "isSecret": false},
            "db_password": {"value": null, "isSecret": true},
        },
        "createdBy": user("Alice Admin"),
        "createdOn": "2023-01-01T10:00:00Z",
        "modifiedBy": user("Bob Builder"),
        "modifiedOn": "2023-02-01T12:30:00Z",
    }))
    .unwrap()
}

pub fn connection(id: &str, name: &str, connection_type: &str) -> ServiceConnection {
    serde_json::from_value(json!({
        "id": id,
        "name": name,
        "type": connection_type,
        "url": "https://management.azure.com/",
        "description": format!("{name} connection"),
        "authorization": {
            "scheme": "ServicePrincipal",
            "parameters": {
                "serviceprincipalkey": "super-secret-value",
                "authenticationType": "spnKey",
                "scope": "subscription",
            },
        },
        "data": {
            "environment": "AzureCloud",
            "subscriptionName": "Production",
            "subscriptionId": "12345678-1234-1234-1234-123456789012",
            "appObjectSecret": "hidden",
        },
        "isShared": false,
        "isReady": true,
        "owner": "Library",
        "createdBy": user("Alice Admin"),
    }))
    .unwrap()
}
