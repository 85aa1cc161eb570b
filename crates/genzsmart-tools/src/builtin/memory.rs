// SPDX-FileCopyrightText: 2026 GenzSmart Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in `retrieve_memory` tool.
//!
//! Memory belongs to a user session, so the lookup is injected. Without one
//! the tool answers with a successful placeholder.

use std::sync::Arc;

use async_trait::async_trait;
use genzsmart_core::{GenzsmartError, MemoryLookup};
use serde_json::{Value, json};

use crate::tool::{Tool, ToolDefinition, ToolOutcome, ToolParameter, ToolType};

pub const NAME: &str = "retrieve_memory";

const DEFAULT_MAX_RESULTS: u64 = 5;

pub struct RetrieveMemoryTool {
    definition: ToolDefinition,
    lookup: Option<Arc<dyn MemoryLookup>>,
}

impl RetrieveMemoryTool {
    pub fn new(lookup: Option<Arc<dyn MemoryLookup>>) -> Self {
        Self {
            definition: ToolDefinition {
                name: NAME.to_string(),
                description: "Retrieve relevant information from user memory".to_string(),
                parameters: vec![
                    ToolParameter::required("query", "string", "What to search for in memory"),
                    ToolParameter::optional(
                        "max_results",
                        "integer",
                        "Maximum number of memories to retrieve",
                        json!(DEFAULT_MAX_RESULTS),
                    ),
                ],
                tool_type: ToolType::Memory,
            },
            lookup,
        }
    }
}

#[async_trait]
impl Tool for RetrieveMemoryTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn invoke(&self, args: Value) -> Result<ToolOutcome, GenzsmartError> {
        let Some(query) = args["query"].as_str() else {
            return Ok(ToolOutcome::failure("Missing required parameter: query"));
        };
        let max_results = args["max_results"].as_u64().unwrap_or(DEFAULT_MAX_RESULTS) as usize;

        let Some(lookup) = &self.lookup else {
            return Ok(ToolOutcome::ok(json!({
                "message": "Memory retrieval requires session context. Use the memory context builder instead.",
                "query": query,
            })));
        };

        let facts = lookup.recall(query, max_results).await?;
        Ok(ToolOutcome::ok(json!({
            "query": query,
            "count": facts.len(),
            "memories": facts,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use genzsmart_core::RecalledFact;

    struct StaticLookup;

    #[async_trait]
    impl MemoryLookup for StaticLookup {
        async fn recall(&self, query: &str, max_results: usize) -> Result<Vec<RecalledFact>, GenzsmartError> {
            Ok(vec![
                RecalledFact {
                    category: "preference".into(),
                    content: format!("Likes {query}"),
                    confidence: 0.9,
                };
                max_results.min(2)
            ])
        }
    }

    #[tokio::test]
    async fn placeholder_without_session() {
        let outcome = RetrieveMemoryTool::new(None)
            .invoke(json!({"query": "food"}))
            .await
            .unwrap();
        assert!(outcome.success);
        assert!(outcome.get("message").unwrap().as_str().unwrap().contains("session context"));
    }

    #[tokio::test]
    async fn uses_injected_lookup() {
        let tool = RetrieveMemoryTool::new(Some(Arc::new(StaticLookup)));
        let outcome = tool.invoke(json!({"query": "pizza", "max_results": 1})).await.unwrap();
        assert_eq!(outcome.get("count"), Some(&json!(1)));
        assert_eq!(outcome.get("memories").unwrap()[0]["content"], "Likes pizza");
    }
}
