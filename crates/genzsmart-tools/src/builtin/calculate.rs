// SPDX-FileCopyrightText: 2026 GenzSmart Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in `calculate` tool.

use async_trait::async_trait;
use genzsmart_core::GenzsmartError;
use serde_json::{Value, json};

use crate::expr;
use crate::tool::{Tool, ToolDefinition, ToolOutcome, ToolParameter, ToolType};

pub const NAME: &str = "calculate";

/// Largest magnitude reported as a JSON integer; beyond it `f64` loses
/// integer precision.
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

pub struct CalculateTool {
    definition: ToolDefinition,
}

impl CalculateTool {
    pub fn new() -> Self {
        Self {
            definition: ToolDefinition {
                name: NAME.to_string(),
                description: "Perform mathematical calculations".to_string(),
                parameters: vec![ToolParameter::required(
                    "expression",
                    "string",
                    "Mathematical expression to evaluate (e.g., '2 + 2', 'max(3, 7) ** 2')",
                )],
                tool_type: ToolType::Calculator,
            },
        }
    }
}

impl Default for CalculateTool {
    fn default() -> Self {
        Self::new()
    }
}

/// Integral values become JSON integers so `2 + 2` reports `4`, not `4.0`.
fn to_json_number(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < MAX_EXACT_INT {
        json!(value as i64)
    } else {
        json!(value)
    }
}

#[async_trait]
impl Tool for CalculateTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn invoke(&self, args: Value) -> Result<ToolOutcome, GenzsmartError> {
        let Some(expression) = args["expression"].as_str() else {
            return Ok(ToolOutcome::failure("Missing required parameter: expression"));
        };
        Ok(match expr::evaluate(expression) {
            Ok(value) => ToolOutcome::ok(json!({
                "result": to_json_number(value),
                "expression": expression,
            })),
            Err(e) => ToolOutcome::failure(format!("Calculation failed: {e}")),
        })
    }
}
