// SPDX-FileCopyrightText: 2026 GenzSmart Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Memory domain types.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// What kind of statement a fact records about the user.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FactCategory {
    Preference,
    PersonalInfo,
    Fact,
    Goal,
    Skill,
}

impl FactCategory {
    pub const ALL: [FactCategory; 5] = [
        FactCategory::Preference,
        FactCategory::Fact,
        FactCategory::Skill,
        FactCategory::Goal,
        FactCategory::PersonalInfo,
    ];

    /// Convert to string for SQLite storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            FactCategory::Preference => "preference",
            FactCategory::PersonalInfo => "personal_info",
            FactCategory::Fact => "fact",
            FactCategory::Goal => "goal",
            FactCategory::Skill => "skill",
        }
    }

    /// Parse a category name, treating anything unrecognized as a plain fact.
    pub fn from_str_lenient(s: &str) -> Self {
        s.trim().to_lowercase().parse().unwrap_or(FactCategory::Fact)
    }

    /// Heading used in prompt digests.
    pub fn label(&self) -> &'static str {
        match self {
            FactCategory::PersonalInfo => "Personal Information",
            FactCategory::Preference => "Preferences",
            FactCategory::Fact => "Known Facts",
            FactCategory::Skill => "Skills & Abilities",
            FactCategory::Goal => "Goals & Objectives",
        }
    }
}

/// A fact produced by extraction, before it is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedFact {
    pub category: FactCategory,
    pub content: String,
    /// Always within [0, 1].
    pub confidence: f64,
    pub source_message: Option<String>,
}

/// A persisted fact. Facts are never hard-deleted; `is_active = false`
/// removes them from every read path except direct repository access.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryFact {
    pub id: String,
    pub conversation_id: Option<String>,
    pub category: FactCategory,
    pub content: String,
    pub confidence: f64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for [`crate::MemoryStorage::add_fact`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewFact {
    pub content: String,
    pub category: FactCategory,
    pub confidence: f64,
    pub conversation_id: Option<String>,
}

impl NewFact {
    pub fn new(content: impl Into<String>, category: FactCategory, confidence: f64) -> Self {
        Self {
            content: content.into(),
            category,
            confidence,
            conversation_id: None,
        }
    }

    pub fn in_conversation(mut self, conversation_id: impl Into<String>) -> Self {
        self.conversation_id = Some(conversation_id.into());
        self
    }
}

impl From<ExtractedFact> for NewFact {
    fn from(fact: ExtractedFact) -> Self {
        NewFact::new(fact.content, fact.category, fact.confidence)
    }
}

/// Partial update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FactUpdate {
    pub content: Option<String>,
    pub confidence: Option<f64>,
    pub is_active: Option<bool>,
}

/// A substring-search hit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredFact {
    pub fact: MemoryFact,
    pub similarity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemoryStats {
    pub total_facts: usize,
    /// Active fact count per category name; every category is present.
    pub by_category: BTreeMap<String, usize>,
}
