//! policy_list tool implementation.
//!
//! Scans a category's listing page and reports every linked document.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::json_result;
use desk_client::{CategoryListing, PolicyService};

/// Parameters for the policy_list tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PolicyListParams {
    /// Category key, e.g. "3000".
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ListedDocument {
    pub identifier: String,
    pub title: String,
    pub location: String,
}

/// Output from the policy_list tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PolicyListOutput {
    pub category: String,
    /// Listing page that was scanned.
    pub location: String,
    /// Linked documents in page order. Identifiers may repeat.
    pub documents: Vec<ListedDocument>,
}

impl From<CategoryListing> for PolicyListOutput {
    fn from(listing: CategoryListing) -> Self {
        Self {
            category: listing.category,
            location: listing.location.to_string(),
            documents: listing
                .entries
                .into_iter()
                .map(|e| ListedDocument { identifier: e.identifier, title: e.title, location: e.location.to_string() })
                .collect(),
        }
    }
}

/// Implementation of the policy_list tool.
pub async fn list_impl(service: &PolicyService, params: PolicyListParams) -> Result<CallToolResult, McpError> {
    let listing = service.list_category_documents(params.category.trim()).await?;
    json_result(&PolicyListOutput::from(listing))
}
