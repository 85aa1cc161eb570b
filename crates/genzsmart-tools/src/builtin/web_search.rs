// SPDX-FileCopyrightText: 2026 GenzSmart Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in `web_search` tool, backed by the shared [`SearchService`].

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use genzsmart_core::{GenzsmartError, SearchType};
use genzsmart_search::{SearchRequest, SearchService};
use serde_json::{Value, json};

use crate::tool::{Tool, ToolDefinition, ToolOutcome, ToolParameter, ToolType};

pub const NAME: &str = "web_search";

const DEFAULT_RESULTS: u64 = 5;
const MAX_RESULTS: u64 = 10;

pub struct WebSearchTool {
    definition: ToolDefinition,
    search: Option<Arc<SearchService>>,
}

impl WebSearchTool {
    /// Without a service every invocation reports that search is not configured.
    pub fn new(search: Option<Arc<SearchService>>) -> Self {
        Self {
            definition: ToolDefinition {
                name: NAME.to_string(),
                description: "Search the web for current information, news, or facts".to_string(),
                parameters: vec![
                    ToolParameter::required("query", "string", "The search query"),
                    ToolParameter::optional(
                        "num_results",
                        "integer",
                        "Number of results to return (1-10)",
                        json!(DEFAULT_RESULTS),
                    ),
                    ToolParameter::optional("search_type", "string", "Type of search", json!("general"))
                        .with_enum(&["general", "news", "images"]),
                ],
                tool_type: ToolType::Search,
            },
            search,
        }
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn invoke(&self, args: Value) -> Result<ToolOutcome, GenzsmartError> {
        let Some(query) = args["query"].as_str().filter(|q| !q.trim().is_empty()) else {
            return Ok(ToolOutcome::failure("Missing required parameter: query"));
        };
        let num_results = args["num_results"]
            .as_u64()
            .unwrap_or(DEFAULT_RESULTS)
            .clamp(1, MAX_RESULTS) as usize;
        let search_type = match args["search_type"].as_str() {
            None => SearchType::General,
            Some(raw) => match SearchType::from_str(raw) {
                Ok(t) => t,
                Err(_) => return Ok(ToolOutcome::failure(format!("Unsupported search_type: {raw}"))),
            },
        };
        let Some(search) = &self.search else {
            return Ok(ToolOutcome::failure("Web search is not configured"));
        };

        let request = SearchRequest::new(query)
            .num_results(num_results)
            .search_type(search_type);
        match search.search_web(request).await {
            Ok(response) => Ok(ToolOutcome::ok(json!({
                "formatted": response.format_for_context(),
                "results": response,
            }))),
            Err(e) => Ok(ToolOutcome::failure(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn validates_arguments_before_searching() {
        let tool = WebSearchTool::new(None);
        let outcome = tool.invoke(json!({})).await.unwrap();
        assert_eq!(outcome.error(), Some("Missing required parameter: query"));

        let outcome = tool
            .invoke(json!({"query": "rust", "search_type": "videos"}))
            .await
            .unwrap();
        assert_eq!(outcome.error(), Some("Unsupported search_type: videos"));
    }

    #[tokio::test]
    async fn unconfigured_service_fails_softly() {
        let outcome = WebSearchTool::new(None)
            .invoke(json!({"query": "rust"}))
            .await
            .unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.error(), Some("Web search is not configured"));
    }

    #[test]
    fn schema_lists_search_types() {
        let schema = WebSearchTool::new(None).definition().to_function_schema();
        let props = &schema["function"]["parameters"]["properties"];
        assert_eq!(props["search_type"]["enum"], json!(["general", "news", "images"]));
        assert_eq!(props["num_results"]["default"], 5);
        assert_eq!(schema["function"]["parameters"]["required"], json!(["query"]));
    }
}
