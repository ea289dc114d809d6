//! MCP tool implementations.
//!
//! This module contains all tools exposed by the policy-desk server. Each
//! tool validates its parameters, calls into [`PolicyService`], and renders
//! the result as pretty-printed JSON text content.

pub mod cache;
pub mod policy;

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;

use desk_core::Error;

/// Wrap a tool output as JSON text content.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}
