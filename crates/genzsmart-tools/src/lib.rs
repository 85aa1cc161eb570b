// SPDX-FileCopyrightText: 2026 GenzSmart Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tool trait, registry, and built-in tools for the GenzSmart agent.
//!
//! Built-in tools:
//! - [`builtin::WebSearchTool`] -- web search through the search service
//! - [`builtin::CalculateTool`] -- whitelisted arithmetic
//! - [`builtin::DateTimeTool`] -- current time in any IANA timezone
//! - [`builtin::RetrieveMemoryTool`], [`builtin::ReadFileTool`] -- session-backed lookups

pub mod builtin;
pub mod expr;
pub mod tool;

pub use builtin::{ToolServices, register_builtins};
pub use tool::{Tool, ToolDefinition, ToolOutcome, ToolParameter, ToolRegistry, ToolType};
