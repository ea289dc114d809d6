//! policy_search tool implementation.
//!
//! Case-insensitive substring search over cached policy text only. Documents
//! that were never fetched are not searched.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::json_result;
use desk_client::PolicyService;
use desk_core::SearchHit;

/// Parameters for the policy_search tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PolicySearchParams {
    /// Text to look for. Matched case-insensitively as a literal substring.
    pub query: String,
}

/// Output from the policy_search tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PolicySearchOutput {
    pub query: String,
    pub total: usize,
    /// Matches ordered by category, then identifier.
    pub results: Vec<SearchHit>,
}

/// Implementation of the policy_search tool.
pub async fn search_impl(service: &PolicyService, params: PolicySearchParams) -> Result<CallToolResult, McpError> {
    let results = service.search_cache(&params.query).await?;
    let output = PolicySearchOutput { query: params.query.trim().to_string(), total: results.len(), results };
    json_result(&output)
}
