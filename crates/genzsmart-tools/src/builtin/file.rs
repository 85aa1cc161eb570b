// SPDX-FileCopyrightText: 2026 GenzSmart Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in `read_file` tool over an injected [`FileContentSource`].

use std::sync::Arc;

use async_trait::async_trait;
use genzsmart_core::{FileContentSource, GenzsmartError};
use serde_json::{Value, json};

use crate::tool::{Tool, ToolDefinition, ToolOutcome, ToolParameter, ToolType};

pub const NAME: &str = "read_file";

pub struct ReadFileTool {
    definition: ToolDefinition,
    source: Option<Arc<dyn FileContentSource>>,
}

impl ReadFileTool {
    pub fn new(source: Option<Arc<dyn FileContentSource>>) -> Self {
        Self {
            definition: ToolDefinition {
                name: NAME.to_string(),
                description: "Read and extract content from uploaded files".to_string(),
                parameters: vec![
                    ToolParameter::required("file_id", "string", "ID of the file to read"),
                    ToolParameter::optional(
                        "extract_text",
                        "boolean",
                        "Whether to extract text content",
                        json!(true),
                    ),
                ],
                tool_type: ToolType::File,
            },
            source,
        }
    }
}

#[async_trait]
impl Tool for ReadFileTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn invoke(&self, args: Value) -> Result<ToolOutcome, GenzsmartError> {
        let Some(file_id) = args["file_id"].as_str() else {
            return Ok(ToolOutcome::failure("Missing required parameter: file_id"));
        };
        let extract_text = args["extract_text"].as_bool().unwrap_or(true);

        let Some(source) = self.source.as_ref().filter(|_| extract_text) else {
            return Ok(ToolOutcome::ok(json!({
                "message": format!("File reading for ID: {file_id}. Requires session context."),
                "file_id": file_id,
            })));
        };

        let content = source.extract_text(file_id).await?;
        Ok(ToolOutcome::ok(json!({
            "file_id": file_id,
            "content": content,
        })))
    }
}
