//! policy_get tool implementation.
//!
//! Returns the full text of one policy document, served from the cache when
//! present and resolved upstream otherwise.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::json_result;
use desk_client::{PolicyService, PolicyText};
use desk_core::{Error, TextSource};

/// Parameters for the policy_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PolicyGetParams {
    /// Category key, e.g. "1000".
    pub category: String,

    /// Policy identifier as shown at the start of its listing title, e.g. "1105".
    pub identifier: String,
}

/// Output from the policy_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PolicyGetOutput {
    pub category: String,
    pub identifier: String,
    /// "cached" or "live".
    pub source: TextSource,
    pub title: Option<String>,
    /// Link to the original PDF.
    pub source_url: Option<String>,
    /// When the text was extracted (RFC 3339).
    pub fetched_at: String,
    pub page_count: Option<i64>,
    pub text: String,
}

impl From<PolicyText> for PolicyGetOutput {
    fn from(text: PolicyText) -> Self {
        Self {
            category: text.category,
            identifier: text.identifier,
            source: text.source,
            title: text.title,
            source_url: text.source_url,
            fetched_at: text.fetched_at,
            page_count: text.page_count,
            text: text.text,
        }
    }
}

/// Implementation of the policy_get tool.
pub async fn get_impl(service: &PolicyService, params: PolicyGetParams) -> Result<CallToolResult, McpError> {
    let category = params.category.trim();
    if category.is_empty() {
        return Err(Error::InvalidInput("category cannot be empty".into()).into());
    }

    let text = service.get_policy_text(category, &params.identifier).await?;
    json_result(&PolicyGetOutput::from(text))
}
