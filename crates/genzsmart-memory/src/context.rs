// SPDX-FileCopyrightText: 2026 GenzSmart Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt digests built from stored facts.

use std::sync::Arc;

use genzsmart_core::GenzsmartError;

use crate::storage::MemoryStorage;
use crate::types::{FactCategory, MemoryFact};

/// Minimum confidence for facts shown when there is no query to rank by.
const UNRANKED_MIN_CONFIDENCE: f64 = 0.7;

/// Messages shorter than this always get memory injected.
const SHORT_MESSAGE_CHARS: usize = 50;

const FIRST_PERSON: &[&str] = &["my", "i", "me", "mine"];

pub struct MemoryContextBuilder {
    storage: Arc<MemoryStorage>,
    max_facts: usize,
}

impl MemoryContextBuilder {
    pub fn new(storage: Arc<MemoryStorage>) -> Self {
        Self {
            storage,
            max_facts: 5,
        }
    }

    pub fn with_max_facts(mut self, max_facts: usize) -> Self {
        self.max_facts = max_facts;
        self
    }

    pub fn storage(&self) -> &Arc<MemoryStorage> {
        &self.storage
    }

    /// A markdown digest of the facts most useful for `query`.
    ///
    /// With a non-blank query, facts come from relevance retrieval. Without
    /// one, the most confident facts (>= 0.7) are used. Returns an empty
    /// string when no fact qualifies.
    pub async fn build_memory_context(
        &self,
        query: Option<&str>,
        max_facts: usize,
        categories: Option<&[FactCategory]>,
    ) -> Result<String, GenzsmartError> {
        let facts = match query.map(str::trim).filter(|q| !q.is_empty()) {
            Some(query) => {
                self.storage
                    .get_facts_for_context(query, max_facts, categories)
                    .await?
            }
            None => {
                let mut facts = self
                    .storage
                    .list_facts(None, usize::MAX, UNRANKED_MIN_CONFIDENCE)
                    .await?;
                if let Some(categories) = categories.filter(|c| !c.is_empty()) {
                    facts.retain(|f| categories.contains(&f.category));
                }
                facts.truncate(max_facts);
                facts
            }
        };
        Ok(render_digest(&facts))
    }

    /// The digest wrapped in instructions for the system prompt, or an empty
    /// string when there is nothing to add.
    pub async fn system_prompt_addition(
        &self,
        query: Option<&str>,
        max_facts: usize,
    ) -> Result<String, GenzsmartError> {
        let context = self.build_memory_context(query, max_facts, None).await?;
        if context.is_empty() {
            return Ok(String::new());
        }
        Ok(format!(
            "The following is information about the user that you should remember and reference:\n\n{context}\n\nUse this information to personalize your responses."
        ))
    }

    /// `base_prompt` followed by the memory addition for `user_message`.
    pub async fn enhanced_system_prompt(
        &self,
        base_prompt: &str,
        user_message: Option<&str>,
    ) -> Result<String, GenzsmartError> {
        let addition = self
            .system_prompt_addition(user_message, self.max_facts)
            .await?;
        if addition.is_empty() {
            return Ok(base_prompt.to_string());
        }
        Ok(format!("{base_prompt}\n\n{addition}"))
    }
}

/// Whether a message probably refers to something the user told us before:
/// any short message, or one using a first-person pronoun as a word.
pub fn should_inject_memory(message: &str) -> bool {
    if message.chars().count() < SHORT_MESSAGE_CHARS {
        return true;
    }
    message
        .to_lowercase()
        .split_whitespace()
        .any(|word| FIRST_PERSON.contains(&word))
}

/// Group facts under category headings, categories in order of first
/// appearance.
fn render_digest(facts: &[MemoryFact]) -> String {
    if facts.is_empty() {
        return String::new();
    }

    let mut groups: Vec<(FactCategory, Vec<&str>)> = Vec::new();
    for fact in facts {
        match groups.iter_mut().find(|(c, _)| *c == fact.category) {
            Some((_, items)) => items.push(fact.content.as_str()),
            None => groups.push((fact.category, vec![fact.content.as_str()])),
        }
    }

    let mut lines = vec!["## User Information".to_string(), String::new()];
    for (category, items) in groups {
        lines.push(format!("### {}", category.label()));
        lines.extend(items.into_iter().map(|item| format!("- {item}")));
        lines.push(String::new());
    }
    lines.join("\n")
}
