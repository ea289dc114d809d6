//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.

use std::sync::Arc;

use crate::tools::cache::{CachePurgeParams, purge_impl};
use crate::tools::policy::{
    PolicyGetParams, PolicyListParams, PolicySearchParams, categories_impl, get_impl, list_impl, search_impl,
};
use desk_client::PolicyService;

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The main MCP server handler for policy-desk.
#[derive(Clone)]
pub struct PolicyDeskServer {
    service: Arc<PolicyService>,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl PolicyDeskServer {
    /// Create a new server handler.
    pub fn new(service: Arc<PolicyService>) -> Self {
        Self { service, tool_router: Self::tool_router() }
    }

    /// Full text of one policy document.
    #[tool(
        description = "Get the full text of a policy by category key and identifier. Served from cache when present; otherwise fetched from the district site, extracted from PDF, and cached."
    )]
    async fn policy_get(&self, params: Parameters<PolicyGetParams>) -> Result<CallToolResult, McpError> {
        get_impl(&self.service, params.0).await
    }

    #[tool(description = "List the policy documents currently linked from a category's listing page.")]
    async fn policy_list(&self, params: Parameters<PolicyListParams>) -> Result<CallToolResult, McpError> {
        list_impl(&self.service, params.0).await
    }

    /// Search previously fetched policies.
    ///
    /// Only cached text is searched; no network requests are made.
    #[tool(
        description = "Case-insensitive substring search over cached policy text. Returns snippets with matches wrapped in <mark>."
    )]
    async fn policy_search(&self, params: Parameters<PolicySearchParams>) -> Result<CallToolResult, McpError> {
        search_impl(&self.service, params.0).await
    }

    #[tool(description = "List the known policy categories and their listing pages.")]
    async fn policy_categories(&self) -> Result<CallToolResult, McpError> {
        categories_impl(&self.service)
    }

    #[tool(description = "Remove cached policy text for one document, one category, or everything.")]
    async fn cache_purge(&self, params: Parameters<CachePurgeParams>) -> Result<CallToolResult, McpError> {
        purge_impl(&self.service, params.0).await
    }
}

impl ServerHandler for PolicyDeskServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "policy-desk".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(
                "Look up school district policies by category (see policy_categories) and identifier. \
                 Use policy_search to find text in policies that were already fetched."
                    .into(),
            ),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
