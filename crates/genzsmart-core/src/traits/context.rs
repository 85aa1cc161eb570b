// SPDX-FileCopyrightText: 2026 GenzSmart Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session-scoped collaborators injected by the caller.
//!
//! File storage and per-user memory live outside the core; these traits are
//! the narrow read paths the orchestrator and tools need from them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::GenzsmartError;

/// Supplies already-extracted text for uploaded files.
#[async_trait]
pub trait FileContentSource: Send + Sync {
    /// Returns the extracted text of `file_id`, or [`GenzsmartError::File`]
    /// / [`GenzsmartError::NotFound`] when it cannot be produced.
    async fn extract_text(&self, file_id: &str) -> Result<String, GenzsmartError>;
}

/// A remembered fact as exposed to tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecalledFact {
    pub category: String,
    pub content: String,
    pub confidence: f64,
}

/// Relevance-ranked read access to long-term memory.
#[async_trait]
pub trait MemoryLookup: Send + Sync {
    async fn recall(&self, query: &str, max_results: usize) -> Result<Vec<RecalledFact>, GenzsmartError>;
}
