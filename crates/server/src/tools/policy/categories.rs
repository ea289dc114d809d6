//! policy_categories tool implementation.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::json_result;
use desk_client::PolicyService;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CategoryInfo {
    pub key: String,
    /// Listing page for the category.
    pub location: String,
}

/// Output from the policy_categories tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PolicyCategoriesOutput {
    pub categories: Vec<CategoryInfo>,
}

/// Implementation of the policy_categories tool.
pub fn categories_impl(service: &PolicyService) -> Result<CallToolResult, McpError> {
    let categories = service
        .categories()
        .map(|(key, location)| CategoryInfo { key: key.to_string(), location: location.to_string() })
        .collect();
    json_result(&PolicyCategoriesOutput { categories })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{decode, offline_service};

    #[tokio::test]
    async fn test_categories_in_key_order() {
        let service = offline_service().await;
        let output: PolicyCategoriesOutput = decode(&categories_impl(&service).unwrap());

        let keys: Vec<&str> = output.categories.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["0000", "1000", "2000", "3000", "4000", "5000", "6000"]);
        assert_eq!(
            output.categories[1].location,
            "https://www.asd103.org/District/465-Series-1000---The-Board-of-Directors.html"
        );
    }
}
