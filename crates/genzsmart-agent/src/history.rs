// SPDX-FileCopyrightText: 2026 GenzSmart Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation-history boundary.
//!
//! The orchestrator only reads prior turns; who stores them is up to the
//! embedding application.

use std::collections::HashMap;

use async_trait::async_trait;
use genzsmart_core::{GenzsmartError, Message, MessageRole};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// One prior message of a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryTurn {
    pub role: MessageRole,
    pub content: String,
}

impl HistoryTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }

    /// Prompt form. Anything that is not a user turn replays as assistant.
    pub fn to_message(&self) -> Message {
        match self.role {
            MessageRole::User => Message::user(self.content.clone()),
            _ => Message::assistant(self.content.clone()),
        }
    }
}

/// Read access to prior turns of a conversation.
#[async_trait]
pub trait HistorySource: Send + Sync {
    /// Up to `limit` most recent turns, oldest first.
    async fn recent_turns(
        &self,
        conversation_id: &str,
        limit: usize,
    ) -> Result<Vec<HistoryTurn>, GenzsmartError>;
}

/// Process-local history keyed by conversation id.
#[derive(Debug, Default)]
pub struct InMemoryHistory {
    turns: RwLock<HashMap<String, Vec<HistoryTurn>>>,
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn append(&self, conversation_id: &str, turn: HistoryTurn) {
        self.turns
            .write()
            .await
            .entry(conversation_id.to_string())
            .or_default()
            .push(turn);
    }
}

#[async_trait]
impl HistorySource for InMemoryHistory {
    async fn recent_turns(
        &self,
        conversation_id: &str,
        limit: usize,
    ) -> Result<Vec<HistoryTurn>, GenzsmartError> {
        let turns = self.turns.read().await;
        let Some(all) = turns.get(conversation_id) else {
            return Ok(Vec::new());
        };
        Ok(all[all.len().saturating_sub(limit)..].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn recent_turns_returns_tail_oldest_first() {
        let history = InMemoryHistory::new();
        for i in 0..5 {
            history.append("c1", HistoryTurn::user(format!("q{i}"))).await;
        }
        let turns = history.recent_turns("c1", 2).await.unwrap();
        assert_eq!(turns, [HistoryTurn::user("q3"), HistoryTurn::user("q4")]);
        assert!(history.recent_turns("other", 2).await.unwrap().is_empty());
    }

    #[test]
    fn non_user_turns_replay_as_assistant() {
        let turn = HistoryTurn {
            role: MessageRole::System,
            content: "note".to_string(),
        };
        assert_eq!(turn.to_message().role, MessageRole::Assistant);
        assert_eq!(HistoryTurn::user("hi").to_message().role, MessageRole::User);
    }
}
