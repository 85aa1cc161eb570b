// SPDX-FileCopyrightText: 2026 GenzSmart Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Long-term memory for GenzSmart.
//!
//! Facts about the user are extracted from messages (model first, phrase
//! patterns as fallback), stored with a confidence score, soft-deleted,
//! merged when near-duplicate, and rendered into a digest that the agent
//! injects into its system prompt.

pub mod context;
pub mod conversation;
pub mod extractor;
pub mod repository;
pub mod storage;
pub mod types;

pub use context::{MemoryContextBuilder, should_inject_memory};
pub use conversation::ConversationMemory;
pub use extractor::{
    MemoryExtractor, extract_facts_pattern, parse_extraction_response, should_extract,
};
pub use repository::{FactRepository, InMemoryFactRepository, SqliteFactRepository};
pub use storage::MemoryStorage;
pub use types::{
    ExtractedFact, FactCategory, FactUpdate, MemoryFact, MemoryStats, NewFact, ScoredFact,
};
