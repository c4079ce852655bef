//! Azure DevOps resource records.
//!
//! These map the REST payloads (camelCase JSON) into typed records. Fields
//! the platform may omit are optional or defaulted, so a sparse payload
//! still decodes.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A user identity reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Identity id.
    pub id: String,
    /// Human-readable name.
    pub display_name: String,
    /// Sign-in name, usually an email address.
    pub unique_name: String,
    /// Avatar URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Where a variable group stores its values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VariableGroupType {
    /// Values stored in Azure DevOps.
    Vsts,
    /// Values linked from an Azure Key Vault.
    AzureKeyVault,
}

impl VariableGroupType {
    /// Wire name of the type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Vsts => "Vsts",
            Self::AzureKeyVault => "AzureKeyVault",
        }
    }
}

impl fmt::Display for VariableGroupType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single variable inside a group.
///
/// Secret variables come back from the API without a value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableValue {
    /// The value, absent for secrets.
    #[serde(default)]
    pub value: Option<String>,
    /// Whether the variable is a secret.
    #[serde(default)]
    pub is_secret: bool,
    /// Whether the variable is read-only.
    #[serde(default)]
    pub is_readonly: bool,
}

/// A pipeline variable group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableGroup {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub group_type: VariableGroupType,
    #[serde(default)]
    pub variables: BTreeMap<String, VariableValue>,
    pub created_by: User,
    pub created_on: DateTime<Utc>,
    pub modified_by: User,
    pub modified_on: DateTime<Utc>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub project_name: Option<String>,
    #[serde(default)]
    pub provider_data: Option<Value>,
}

impl VariableGroup {
    /// Number of secret variables in the group.
    #[must_use]
    pub fn secret_count(&self) -> usize {
        self.variables.values().filter(|v| v.is_secret).count()
    }
}

/// Kind of external service a connection targets.
///
/// Types this crate does not know are kept verbatim in
/// [`ServiceConnectionType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ServiceConnectionType {
    AzureRm,
    GitHub,
    DockerRegistry,
    Kubernetes,
    #[default]
    Generic,
    Other(String),
}

impl ServiceConnectionType {
    /// Wire name of the type.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::AzureRm => "azurerm",
            Self::GitHub => "github",
            Self::DockerRegistry => "dockerregistry",
            Self::Kubernetes => "kubernetes",
            Self::Generic => "generic",
            Self::Other(name) => name,
        }
    }

    /// Case-insensitive comparison against a type name.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        self.as_str().eq_ignore_ascii_case(name.trim())
    }
}

impl From<String> for ServiceConnectionType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "azurerm" => Self::AzureRm,
            "github" => Self::GitHub,
            "dockerregistry" => Self::DockerRegistry,
            "kubernetes" => Self::Kubernetes,
            "generic" => Self::Generic,
            _ => Self::Other(value),
        }
    }
}

impl From<ServiceConnectionType> for String {
    fn from(value: ServiceConnectionType) -> Self {
        match value {
            ServiceConnectionType::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ServiceConnectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authorization block of a service connection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceEndpointAuthorization {
    #[serde(default)]
    pub scheme: String,
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

/// A service connection (service endpoint).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "ServiceEndpointPayload")]
pub struct ServiceConnection {
    pub id: String,
    pub name: String,
    pub connection_type: ServiceConnectionType,
    pub url: Option<String>,
    pub description: Option<String>,
    pub authorization: ServiceEndpointAuthorization,
    pub data: Map<String, Value>,
    pub is_shared: bool,
    pub is_ready: bool,
    pub owner: String,
    pub created_by: Option<User>,
    /// Id of the first project the connection is shared with.
    pub project_id: Option<String>,
    /// Name of the first project the connection is shared with.
    pub project_name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServiceEndpointPayload {
    id: String,
    name: String,
    #[serde(rename = "type", default)]
    connection_type: ServiceConnectionType,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    authorization: Option<ServiceEndpointAuthorization>,
    #[serde(default)]
    data: Option<Map<String, Value>>,
    #[serde(default)]
    is_shared: bool,
    #[serde(default)]
    is_ready: bool,
    #[serde(default)]
    owner: Option<String>,
    #[serde(default)]
    created_by: Option<User>,
    #[serde(default)]
    service_endpoint_project_references: Vec<ProjectReferenceEntry>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectReferenceEntry {
    #[serde(default)]
    project_reference: Option<ProjectReference>,
}

#[derive(Deserialize)]
struct ProjectReference {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

impl From<ServiceEndpointPayload> for ServiceConnection {
    fn from(payload: ServiceEndpointPayload) -> Self {
        let reference = payload
            .service_endpoint_project_references
            .into_iter()
            .next()
            .and_then(|entry| entry.project_reference);
        let (project_id, project_name) =
            reference.map_or((None, None), |r| (r.id, r.name));

        Self {
            id: payload.id,
            name: payload.name,
            connection_type: payload.connection_type,
            url: payload.url,
            description: payload.description,
            authorization: payload.authorization.unwrap_or_default(),
            data: payload.data.unwrap_or_default(),
            is_shared: payload.is_shared,
            is_ready: payload.is_ready,
            owner: payload.owner.unwrap_or_default(),
            created_by: payload.created_by,
            project_id,
            project_name,
        }
    }
}

/// A team project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub url: String,
    pub state: String,
    pub visibility: String,
    pub last_update_time: DateTime<Utc>,
}

/// The `{count, value}` envelope wrapped around list responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiList<T> {
    #[serde(default)]
    pub count: Option<usize>,
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
}

impl<T> ApiList<T> {
    /// Unwraps the listed items.
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.value
    }
}
