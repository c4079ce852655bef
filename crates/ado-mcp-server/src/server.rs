//! MCP tool surface.
//!
//! Each tool forwards to a service in `ado-mcp-tools` and returns the
//! service's JSON payload as a single text content item. Service failures are
//! reported inside the payload (`success: false`), so the MCP call itself only
//! fails if the payload cannot be serialized.

use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo};
use rmcp::{ErrorData as McpError, ServerHandler, tool, tool_handler, tool_router};
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::debug;

use ado_mcp_tools::ToolResponse;

use crate::context::AppContext;

const INSTRUCTIONS: &str = "Read-only access to Azure DevOps variable groups and service \
connections. Secret variable values and connection credentials are always masked.";

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListVariableGroupsArgs {
    /// Project name or ID
    pub project: String,
    /// Only return groups with this exact name
    #[serde(default)]
    pub group_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetVariableGroupArgs {
    /// Project name or ID
    pub project: String,
    /// Variable group ID
    pub group_id: i64,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListServiceConnectionsArgs {
    /// Project name or ID
    pub project: String,
    /// Only return connections of this type, e.g. `azurerm` (case-insensitive)
    #[serde(default, alias = "type")]
    pub connection_type: Option<String>,
    /// Include connections shared from other projects
    #[serde(default = "default_include_shared")]
    pub include_shared: bool,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetServiceConnectionArgs {
    /// Project name or ID
    pub project: String,
    /// Service connection ID
    pub connection_id: String,
}

const fn default_include_shared() -> bool {
    true
}

/// MCP server exposing the four Azure DevOps tools.
#[derive(Clone)]
pub struct AdoMcpServer {
    context: Arc<AppContext>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl AdoMcpServer {
    #[must_use]
    pub fn new(context: Arc<AppContext>) -> Self {
        Self {
            context,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(description = "List all variable groups in an Azure DevOps project")]
    async fn list_variable_groups(
        &self,
        Parameters(args): Parameters<ListVariableGroupsArgs>,
    ) -> Result<CallToolResult, McpError> {
        let response = self
            .context
            .variable_groups()
            .list_variable_groups(&args.project, args.group_name.as_deref())
            .await;
        respond("list_variable_groups", &response)
    }

    #[tool(description = "Get detailed information about a specific variable group")]
    async fn get_variable_group(
        &self,
        Parameters(args): Parameters<GetVariableGroupArgs>,
    ) -> Result<CallToolResult, McpError> {
        let response = self
            .context
            .variable_groups()
            .get_variable_group_details(&args.project, args.group_id)
            .await;
        respond("get_variable_group", &response)
    }

    #[tool(description = "List all service connections in an Azure DevOps project")]
    async fn list_service_connections(
        &self,
        Parameters(args): Parameters<ListServiceConnectionsArgs>,
    ) -> Result<CallToolResult, McpError> {
        let response = self
            .context
            .service_connections()
            .list_service_connections(
                &args.project,
                args.connection_type.as_deref(),
                args.include_shared,
            )
            .await;
        respond("list_service_connections", &response)
    }

    #[tool(description = "Get detailed information about a specific service connection")]
    async fn get_service_connection(
        &self,
        Parameters(args): Parameters<GetServiceConnectionArgs>,
    ) -> Result<CallToolResult, McpError> {
        let response = self
            .context
            .service_connections()
            .get_service_connection_details(&args.project, &args.connection_id)
            .await;
        respond("get_service_connection", &response)
    }
}

#[tool_handler]
impl ServerHandler for AdoMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Implementation::default()
            },
            ..ServerInfo::default()
        }
    }
}

fn respond(tool: &str, response: &ToolResponse) -> Result<CallToolResult, McpError> {
    debug!(tool, success = response.success, "Tool call finished");

    let text = response
        .to_json()
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(text)]))
}
