// SPDX-FileCopyrightText: 2026 GenzSmart Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock search backend with a call counter.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use genzsmart_core::{
    AdapterType, GenzsmartError, HealthStatus, PluginAdapter, SearchParams, SearchProvider,
    SearchResponse, SearchResult, SearchType,
};

/// `n` deterministic results for `query`.
pub fn sample_results(query: &str, n: usize) -> Vec<SearchResult> {
    (1..=n)
        .map(|i| SearchResult {
            title: format!("{query} result {i}"),
            url: format!("https://example.com/{i}"),
            snippet: format!("Snippet {i} about {query}"),
            source: "example.com".to_string(),
            published_date: None,
            thumbnail: None,
        })
        .collect()
}

pub struct MockSearchProvider {
    id: String,
    available: bool,
    fail: bool,
    calls: AtomicUsize,
}

impl MockSearchProvider {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            available: true,
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn unavailable(id: &str) -> Self {
        Self {
            available: false,
            ..Self::new(id)
        }
    }

    /// Available, but every search fails.
    pub fn failing(id: &str) -> Self {
        Self {
            fail: true,
            ..Self::new(id)
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PluginAdapter for MockSearchProvider {
    fn name(&self) -> &str {
        &self.id
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Search
    }

    async fn health_check(&self) -> Result<HealthStatus, GenzsmartError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl SearchProvider for MockSearchProvider {
    fn provider_id(&self) -> &str {
        &self.id
    }

    fn provider_name(&self) -> &str {
        &self.id
    }

    fn is_available(&self) -> bool {
        self.available
    }

    async fn search(
        &self,
        query: &str,
        num_results: usize,
        _search_type: SearchType,
        _params: &SearchParams,
    ) -> Result<SearchResponse, GenzsmartError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(GenzsmartError::provider(format!("{} is down", self.id)));
        }
        Ok(SearchResponse::new(
            query,
            &self.id,
            sample_results(query, num_results),
            0.01,
        ))
    }
}
