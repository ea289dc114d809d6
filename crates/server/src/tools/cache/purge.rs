//! cache_purge tool implementation.
//!
//! Removes cached policy text by reference, by category, or entirely. The
//! next `policy_get` for a purged reference resolves it upstream again.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::json_result;
use desk_client::{PolicyService, PurgeScope};
use desk_core::{Error, PolicyRef};

/// Parameters for the cache_purge tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeParams {
    /// Purge entries in this category.
    #[serde(default)]
    pub category: Option<String>,

    /// With `category`, purge only this one document.
    #[serde(default)]
    pub identifier: Option<String>,

    /// Purge every cached document. Cannot be combined with other fields.
    #[serde(default)]
    pub all: bool,
}

/// Output from the cache_purge tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeOutput {
    /// Number of entries deleted.
    pub deleted: u64,
}

fn scope(params: CachePurgeParams) -> Result<PurgeScope, Error> {
    let category = params.category.map(|c| c.trim().to_string()).filter(|c| !c.is_empty());
    let identifier = params.identifier.map(|i| i.trim().to_string()).filter(|i| !i.is_empty());

    match (params.all, category, identifier) {
        (true, None, None) => Ok(PurgeScope::All),
        (true, _, _) => Err(Error::InvalidInput("all cannot be combined with category or identifier".into())),
        (false, Some(category), Some(identifier)) => Ok(PurgeScope::Reference(PolicyRef::new(category, identifier))),
        (false, Some(category), None) => Ok(PurgeScope::Category(category)),
        (false, None, Some(_)) => Err(Error::InvalidInput("identifier requires category".into())),
        (false, None, None) => Err(Error::InvalidInput("category or all must be specified".into())),
    }
}

/// Implementation of the cache_purge tool.
pub async fn purge_impl(service: &PolicyService, params: CachePurgeParams) -> Result<CallToolResult, McpError> {
    let scope = scope(params)?;
    let deleted = service.purge(scope).await?;
    json_result(&CachePurgeOutput { deleted })
}
