// SPDX-FileCopyrightText: 2026 GenzSmart Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Search provider trait for web search backends.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::error::GenzsmartError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{SearchResponse, SearchType};

/// Extra backend-specific parameters (offset, freshness, region...).
///
/// Ordered so that cache fingerprints are deterministic.
pub type SearchParams = BTreeMap<String, String>;

/// Normalized interface to one web search backend.
#[async_trait]
pub trait SearchProvider: PluginAdapter {
    /// Stable identifier (`brave`, `serpapi`, `duckduckgo`, `duckduckgo_lite`).
    fn provider_id(&self) -> &str;

    /// Human-readable backend name.
    fn provider_name(&self) -> &str;

    /// Whether the backend can be called right now (credential present).
    /// Must not perform network I/O.
    fn is_available(&self) -> bool;

    /// Runs a search and normalizes the backend's result shape.
    async fn search(
        &self,
        query: &str,
        num_results: usize,
        search_type: SearchType,
        params: &SearchParams,
    ) -> Result<SearchResponse, GenzsmartError>;
}
