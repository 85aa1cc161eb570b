// SPDX-FileCopyrightText: 2026 GenzSmart Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tool trait and registry.
//!
//! Every tool carries an immutable [`ToolDefinition`] describing its
//! parameters. The [`ToolRegistry`] dispatches by name and renders the
//! definitions as an OpenAI-style function-calling catalog.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use genzsmart_core::GenzsmartError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use strum::{Display, EnumString};
use tracing::{debug, warn};

/// Broad grouping of a tool's capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ToolType {
    Search,
    Memory,
    File,
    Calculator,
    Datetime,
}

/// One named argument of a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolParameter {
    pub name: String,
    /// JSON-schema type name (`string`, `integer`, `boolean`...).
    #[serde(rename = "type")]
    pub param_type: String,
    pub description: String,
    pub required: bool,
    pub default: Option<Value>,
    #[serde(rename = "enum")]
    pub enum_values: Option<Vec<String>>,
}

impl ToolParameter {
    pub fn required(name: &str, param_type: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            param_type: param_type.to_string(),
            description: description.to_string(),
            required: true,
            default: None,
            enum_values: None,
        }
    }

    pub fn optional(name: &str, param_type: &str, description: &str, default: Value) -> Self {
        Self {
            required: false,
            default: Some(default),
            ..Self::required(name, param_type, description)
        }
    }

    pub fn with_enum(mut self, values: &[&str]) -> Self {
        self.enum_values = Some(values.iter().map(|v| v.to_string()).collect());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// Declaration order is preserved in the rendered schema's `required`.
    pub parameters: Vec<ToolParameter>,
    pub tool_type: ToolType,
}

impl ToolDefinition {
    /// Renders the function-calling shape:
    ///
    /// ```json
    /// {
    ///   "type": "function",
    ///   "function": {
    ///     "name": "...",
    ///     "description": "...",
    ///     "parameters": { "type": "object", "properties": {...}, "required": [...] }
    ///   }
    /// }
    /// ```
    pub fn to_function_schema(&self) -> Value {
        let mut properties = Map::new();
        for p in &self.parameters {
            let mut prop = Map::new();
            prop.insert("type".into(), json!(p.param_type));
            prop.insert("description".into(), json!(p.description));
            if let Some(values) = &p.enum_values {
                prop.insert("enum".into(), json!(values));
            }
            if let Some(default) = &p.default {
                prop.insert("default".into(), default.clone());
            }
            properties.insert(p.name.clone(), Value::Object(prop));
        }
        let required: Vec<&str> = self
            .parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();

        json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": {
                    "type": "object",
                    "properties": properties,
                    "required": required,
                }
            }
        })
    }
}

/// Structured result of a tool execution.
///
/// Serializes flat: `{"success": true, ...data}` or
/// `{"success": false, "error": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOutcome {
    pub success: bool,
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

impl ToolOutcome {
    /// A successful outcome. Non-object `data` is stored under `result`.
    pub fn ok(data: Value) -> Self {
        let data = match data {
            Value::Object(map) => map,
            other => {
                let mut map = Map::new();
                map.insert("result".into(), other);
                map
            }
        };
        Self {
            success: true,
            data,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        let mut data = Map::new();
        data.insert("error".into(), Value::String(error.into()));
        Self {
            success: false,
            data,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn error(&self) -> Option<&str> {
        self.data.get("error").and_then(Value::as_str)
    }

    pub fn to_json(&self) -> Value {
        let mut map = self.data.clone();
        map.insert("success".into(), Value::Bool(self.success));
        Value::Object(map)
    }
}

/// A named, schema-described callable.
#[async_trait]
pub trait Tool: Send + Sync {
    fn definition(&self) -> &ToolDefinition;

    fn name(&self) -> &str {
        &self.definition().name
    }

    fn description(&self) -> &str {
        &self.definition().description
    }

    fn tool_type(&self) -> ToolType {
        self.definition().tool_type
    }

    fn parameters(&self) -> &[ToolParameter] {
        &self.definition().parameters
    }

    /// Runs the tool. Expected failures (bad arguments, backend errors)
    /// should come back as [`ToolOutcome::failure`]; an `Err` is converted
    /// to one by the registry.
    async fn invoke(&self, args: Value) -> Result<ToolOutcome, GenzsmartError>;
}

/// Registry of available tools, indexed by name.
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Registers a tool under its `name()`, replacing any previous holder.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Registered tool names, sorted.
    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// All definitions, sorted by name.
    pub fn definitions(&self) -> Vec<&ToolDefinition> {
        let mut defs: Vec<&ToolDefinition> = self.tools.values().map(|t| t.definition()).collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    pub fn function_schemas(&self) -> Vec<Value> {
        self.definitions()
            .into_iter()
            .map(ToolDefinition::to_function_schema)
            .collect()
    }

    /// Dispatches by name. Never fails: unknown tools and tool errors both
    /// come back as `success = false`.
    pub async fn execute_tool(&self, name: &str, args: Value) -> ToolOutcome {
        let Some(tool) = self.get(name) else {
            return ToolOutcome::failure(format!("Tool not found: {name}"));
        };
        debug!(tool = name, "executing tool");
        match tool.invoke(args).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(tool = name, error = %e, "tool execution failed");
                ToolOutcome::failure(e.to_string())
            }
        }
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
