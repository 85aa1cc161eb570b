// SPDX-FileCopyrightText: 2026 GenzSmart Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation orchestration for GenzSmart.
//!
//! The [`AgentOrchestrator`] is the central coordinator that:
//! - Decides whether a turn needs a web search
//! - Assembles the prompt from base instructions, memory, search results,
//!   attached files and recent history
//! - Runs the completion, executes tool calls found in the answer, and
//!   re-synthesizes when a tool succeeded
//! - Stores facts learned from the user message
//!
//! Streaming turns go through [`AgentOrchestrator::stream_message`] and yield
//! [`AgentEvent`]s.

pub mod detect;
pub mod events;
pub mod files;
pub mod history;
pub mod orchestrator;
pub mod prompt;

pub use detect::{DetectedCall, ToolCallRecord, detect_tool_calls};
pub use events::{AgentEvent, AgentEventStream, STREAM_ERROR_CODE};
pub use history::{HistorySource, HistoryTurn, InMemoryHistory};
pub use orchestrator::{
    AgentContext, AgentMemory, AgentOrchestrator, AgentResponse, AgentServices, AgentSettings,
};
pub use prompt::{format_search_context, needs_search};
