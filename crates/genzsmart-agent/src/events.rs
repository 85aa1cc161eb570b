// SPDX-FileCopyrightText: 2026 GenzSmart Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Live-streaming event contract.
//!
//! A streamed answer is always `start`, zero or more `token`s, then exactly
//! one of `done` or `error`.

use std::pin::Pin;

use chrono::{DateTime, Utc};
use futures::Stream;
use genzsmart_core::GenzsmartError;
use serde::Serialize;

/// Error code carried by every `error` event.
pub const STREAM_ERROR_CODE: &str = "STREAM_ERROR";

pub type AgentEventStream = Pin<Box<dyn Stream<Item = AgentEvent> + Send>>;

/// One event of a streamed answer. Serializes to the event's data payload;
/// the event name comes from [`AgentEvent::name`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AgentEvent {
    Start {
        message_id: String,
        timestamp: DateTime<Utc>,
    },
    Token {
        token: String,
        /// Zero-based, increases by one per token.
        index: usize,
    },
    Done {
        finish_reason: String,
    },
    Error {
        error: String,
        code: String,
    },
}

impl AgentEvent {
    pub fn start(message_id: impl Into<String>) -> Self {
        AgentEvent::Start {
            message_id: message_id.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn error(error: &GenzsmartError) -> Self {
        AgentEvent::Error {
            error: error.to_string(),
            code: STREAM_ERROR_CODE.to_string(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AgentEvent::Start { .. } => "start",
            AgentEvent::Token { .. } => "token",
            AgentEvent::Done { .. } => "done",
            AgentEvent::Error { .. } => "error",
        }
    }

    /// Whether no further events follow this one.
    pub fn is_terminal(&self) -> bool {
        matches!(self, AgentEvent::Done { .. } | AgentEvent::Error { .. })
    }

    /// The event as a server-sent-events frame.
    pub fn to_sse(&self) -> String {
        let data = serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string());
        format!("event: {}\ndata: {data}\n\n", self.name())
    }
}
