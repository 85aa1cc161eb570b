// SPDX-FileCopyrightText: 2026 GenzSmart Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-conversation memory capture.

use std::sync::Arc;

use genzsmart_core::MessageRole;
use tracing::{debug, warn};

use crate::extractor::{MemoryExtractor, should_extract};
use crate::storage::{CONTEXT_MIN_CONFIDENCE, MemoryStorage};
use crate::types::{MemoryFact, NewFact};

/// Extracts facts from one conversation's messages and stores them tagged
/// with the conversation id.
pub struct ConversationMemory {
    storage: Arc<MemoryStorage>,
    extractor: Arc<MemoryExtractor>,
    conversation_id: Option<String>,
    min_confidence: f64,
}

impl ConversationMemory {
    pub fn new(
        storage: Arc<MemoryStorage>,
        extractor: Arc<MemoryExtractor>,
        conversation_id: Option<String>,
    ) -> Self {
        Self {
            storage,
            extractor,
            conversation_id,
            min_confidence: CONTEXT_MIN_CONFIDENCE,
        }
    }

    /// Raise the persistence floor. Values below 0.5 are ignored.
    pub fn with_min_confidence(mut self, min_confidence: f64) -> Self {
        self.min_confidence = min_confidence.max(CONTEXT_MIN_CONFIDENCE);
        self
    }

    /// Extract facts from `message` and persist the confident ones.
    ///
    /// `context` holds earlier message texts of the conversation, oldest
    /// first. Returns the facts actually stored; gated-out messages store
    /// nothing. A fact the store rejects is logged and skipped, so the result
    /// always reflects what was persisted.
    pub async fn extract_and_store(
        &self,
        message: &str,
        role: MessageRole,
        context: &[String],
    ) -> Vec<MemoryFact> {
        if !should_extract(message, role) {
            return Vec::new();
        }

        let mut stored = Vec::new();
        for fact in self.extractor.extract_facts(message, context).await {
            if fact.confidence < self.min_confidence {
                debug!(confidence = fact.confidence, "skipping low-confidence fact");
                continue;
            }
            let mut new = NewFact::from(fact);
            new.conversation_id = self.conversation_id.clone();
            match self.storage.add_fact(new).await {
                Ok(fact) => stored.push(fact),
                Err(e) => warn!(error = %e, "failed to store memory fact"),
            }
        }
        stored
    }
}
