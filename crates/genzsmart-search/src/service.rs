// SPDX-FileCopyrightText: 2026 GenzSmart Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider selection, failover and caching in front of the search adapters.

use std::sync::Arc;
use std::time::Duration;

use genzsmart_config::SearchConfig;
use genzsmart_core::error::GenzsmartError;
use genzsmart_core::traits::{SearchParams, SearchProvider};
use genzsmart_core::types::{SearchResponse, SearchType};
use serde::Serialize;
use tracing::{debug, info};

use crate::brave::BraveSearch;
use crate::cache::{CacheStats, SearchCache, fingerprint};
use crate::duckduckgo::DuckDuckGoSearch;
use crate::serpapi::SerpApiSearch;

const BRAVE_KEY_ENV: &str = "BRAVE_API_KEY";
const SERPAPI_KEY_ENV: &str = "SERPAPI_API_KEY";

/// One search invocation. Built with [`SearchRequest::new`] and the chained
/// setters; unset fields take the service defaults.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub query: String,
    pub provider: Option<String>,
    pub num_results: Option<usize>,
    pub search_type: SearchType,
    pub use_cache: bool,
    pub params: SearchParams,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            provider: None,
            num_results: None,
            search_type: SearchType::General,
            use_cache: true,
            params: SearchParams::new(),
        }
    }

    pub fn provider(mut self, id: impl Into<String>) -> Self {
        self.provider = Some(id.into());
        self
    }

    pub fn num_results(mut self, n: usize) -> Self {
        self.num_results = Some(n);
        self
    }

    pub fn search_type(mut self, search_type: SearchType) -> Self {
        self.search_type = search_type;
        self
    }

    pub fn use_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

/// Availability summary for one registered backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderStatus {
    pub id: String,
    pub name: String,
    pub available: bool,
}

/// Search front door shared by the orchestrator and the `web_search` tool.
pub struct SearchService {
    /// Registered backends in failover order.
    providers: Vec<Arc<dyn SearchProvider>>,
    /// Returned by [`SearchService::default_provider`] when nothing earlier
    /// in the order is available.
    fallback: Arc<dyn SearchProvider>,
    cache: SearchCache,
    default_num_results: usize,
}

impl SearchService {
    /// Assembles a service from explicit parts. `fallback` is registered
    /// too if it is not already among `providers`.
    pub fn new(
        mut providers: Vec<Arc<dyn SearchProvider>>,
        fallback: Arc<dyn SearchProvider>,
        cache: SearchCache,
        default_num_results: usize,
    ) -> Self {
        if !providers
            .iter()
            .any(|p| p.provider_id() == fallback.provider_id())
        {
            providers.push(fallback.clone());
        }
        Self {
            providers,
            fallback,
            cache,
            default_num_results,
        }
    }

    /// Brave, then SerpAPI, then DuckDuckGo; DuckDuckGo Lite is reachable
    /// by id only. Keys missing from config fall back to `BRAVE_API_KEY`
    /// and `SERPAPI_API_KEY`.
    pub fn from_config(config: &SearchConfig) -> Result<Self, GenzsmartError> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let brave_key = config_or_env(config.brave_api_key.as_deref(), BRAVE_KEY_ENV);
        let serpapi_key = config_or_env(config.serpapi_api_key.as_deref(), SERPAPI_KEY_ENV);

        let duckduckgo: Arc<dyn SearchProvider> =
            Arc::new(DuckDuckGoSearch::html(&config.region, timeout)?);
        let providers: Vec<Arc<dyn SearchProvider>> = vec![
            Arc::new(BraveSearch::new(brave_key, timeout)?),
            Arc::new(SerpApiSearch::new(serpapi_key, timeout)?),
            duckduckgo.clone(),
            Arc::new(DuckDuckGoSearch::lite(&config.region, timeout)?),
        ];

        Ok(Self::new(
            providers,
            duckduckgo,
            SearchCache::new(Duration::from_secs(config.cache_ttl_secs)),
            config.default_num_results,
        ))
    }

    /// First available backend in failover order. Never empty-handed: the
    /// fallback is returned even if it reports itself unavailable.
    pub fn default_provider(&self) -> Arc<dyn SearchProvider> {
        self.providers
            .iter()
            .find(|p| p.is_available())
            .cloned()
            .unwrap_or_else(|| self.fallback.clone())
    }

    pub fn provider(&self, id: &str) -> Result<Arc<dyn SearchProvider>, GenzsmartError> {
        self.providers
            .iter()
            .find(|p| p.provider_id() == id)
            .cloned()
            .ok_or_else(|| GenzsmartError::NotFound {
                resource: "search provider".to_string(),
                id: id.to_string(),
            })
    }

    pub fn available_providers(&self) -> Vec<ProviderStatus> {
        self.providers
            .iter()
            .map(|p| ProviderStatus {
                id: p.provider_id().to_string(),
                name: p.provider_name().to_string(),
                available: p.is_available(),
            })
            .collect()
    }

    /// Runs a search through the named (or default) backend.
    ///
    /// With `use_cache`, a response stored under the same fingerprint within
    /// the TTL is returned with `cached = true` and no backend call.
    pub async fn search_web(&self, request: SearchRequest) -> Result<SearchResponse, GenzsmartError> {
        if request.query.trim().is_empty() {
            return Err(GenzsmartError::validation("query", "search query must not be empty"));
        }

        let provider = match &request.provider {
            Some(id) => self.provider(id)?,
            None => self.default_provider(),
        };
        let provider_id = provider.provider_id().to_string();
        if !provider.is_available() {
            return Err(GenzsmartError::ProviderNotConfigured {
                provider: provider_id,
            });
        }

        let key = fingerprint(&request.query, &provider_id, request.search_type, &request.params);
        if request.use_cache
            && let Some(hit) = self.cache.get(&key)
        {
            debug!(provider = %provider_id, query = %request.query, "search cache hit");
            return Ok(hit);
        }

        let num_results = request.num_results.unwrap_or(self.default_num_results);
        let response = provider
            .search(&request.query, num_results, request.search_type, &request.params)
            .await?;
        info!(
            provider = %provider_id,
            results = response.total_results,
            elapsed_secs = response.search_time,
            "web search complete"
        );

        if request.use_cache {
            self.cache.insert(key, response.clone());
        }
        Ok(response)
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

fn config_or_env(configured: Option<&str>, env_var: &str) -> Option<String> {
    configured
        .filter(|k| !k.trim().is_empty())
        .map(str::to_string)
        .or_else(|| std::env::var(env_var).ok())
        .filter(|k| !k.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_builder_defaults() {
        let request = SearchRequest::new("rust");
        assert!(request.use_cache);
        assert_eq!(request.search_type, SearchType::General);
        assert!(request.provider.is_none());

        let request = request
            .provider("brave")
            .num_results(3)
            .search_type(SearchType::News)
            .use_cache(false)
            .param("freshness", "pd");
        assert_eq!(request.provider.as_deref(), Some("brave"));
        assert_eq!(request.num_results, Some(3));
        assert!(!request.use_cache);
        assert_eq!(request.params.get("freshness").map(String::as_str), Some("pd"));
    }

    #[test]
    fn from_config_registers_all_backends() {
        let config = SearchConfig {
            brave_api_key: Some("brave-key".into()),
            ..SearchConfig::default()
        };
        let service = SearchService::from_config(&config).unwrap();
        let ids: Vec<String> = service
            .available_providers()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, ["brave", "serpapi", "duckduckgo", "duckduckgo_lite"]);
        assert_eq!(service.default_provider().provider_id(), "brave");
    }

    #[test]
    fn configured_key_wins_over_blank() {
        assert_eq!(config_or_env(Some("abc"), "GENZSMART_UNSET_VAR"), Some("abc".into()));
        assert_eq!(config_or_env(Some("  "), "GENZSMART_UNSET_VAR"), None);
        assert_eq!(config_or_env(None, "GENZSMART_UNSET_VAR"), None);
    }
}
