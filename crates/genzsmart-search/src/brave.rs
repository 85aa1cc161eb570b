// SPDX-FileCopyrightText: 2026 GenzSmart Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Brave Search API adapter.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use genzsmart_core::error::GenzsmartError;
use genzsmart_core::traits::{PluginAdapter, SearchParams, SearchProvider};
use genzsmart_core::types::{AdapterType, HealthStatus, SearchResponse, SearchResult, SearchType};
use serde::Deserialize;
use tracing::debug;

use crate::http::{build_client, check_status, domain_of, read_json, transport_error};

pub const PROVIDER_ID: &str = "brave";
pub const DEFAULT_BASE_URL: &str = "https://api.search.brave.com/res/v1";

/// Brave caps `count` at 20 per request.
const MAX_COUNT: usize = 20;

/// Parameters forwarded verbatim when present.
const FORWARDED_PARAMS: &[&str] = &["offset", "freshness"];

pub struct BraveSearch {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl BraveSearch {
    pub fn new(api_key: Option<String>, timeout: Duration) -> Result<Self, GenzsmartError> {
        Ok(Self {
            client: build_client(PROVIDER_ID, timeout)?,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self, search_type: SearchType) -> String {
        let path = match search_type {
            SearchType::General => "web/search",
            SearchType::News => "news/search",
            SearchType::Images => "images/search",
        };
        format!("{}/{path}", self.base_url)
    }
}

// --- Wire types ---

#[derive(Debug, Default, Deserialize)]
struct WebResponse {
    #[serde(default)]
    web: Option<ResultList>,
}

#[derive(Debug, Default, Deserialize)]
struct ResultList {
    #[serde(default)]
    results: Vec<BraveItem>,
}

#[derive(Debug, Default, Deserialize)]
struct BraveItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    age: Option<String>,
    #[serde(default)]
    page_age: Option<String>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    meta_url: Option<MetaUrl>,
    #[serde(default)]
    profile: Option<Profile>,
    #[serde(default)]
    thumbnail: Option<Thumbnail>,
}

#[derive(Debug, Default, Deserialize)]
struct MetaUrl {
    #[serde(default)]
    hostname: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Profile {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Thumbnail {
    #[serde(default)]
    src: Option<String>,
}

impl BraveItem {
    fn into_result(self) -> SearchResult {
        let source = self
            .meta_url
            .and_then(|m| m.hostname)
            .map(|h| h.trim_start_matches("www.").to_string())
            .or_else(|| self.profile.and_then(|p| p.name))
            .or(self.source)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| domain_of(&self.url));
        SearchResult {
            title: self.title,
            snippet: self.description,
            source,
            published_date: self.age.or(self.page_age),
            thumbnail: self.thumbnail.and_then(|t| t.src),
            url: self.url,
        }
    }
}

#[async_trait]
impl PluginAdapter for BraveSearch {
    fn name(&self) -> &str {
        PROVIDER_ID
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Search
    }

    async fn health_check(&self) -> Result<HealthStatus, GenzsmartError> {
        Ok(if self.is_available() {
            HealthStatus::Healthy
        } else {
            HealthStatus::Unhealthy("BRAVE_API_KEY not configured".into())
        })
    }
}

#[async_trait]
impl SearchProvider for BraveSearch {
    fn provider_id(&self) -> &str {
        PROVIDER_ID
    }

    fn provider_name(&self) -> &str {
        "Brave Search"
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    async fn search(
        &self,
        query: &str,
        num_results: usize,
        search_type: SearchType,
        params: &SearchParams,
    ) -> Result<SearchResponse, GenzsmartError> {
        let Some(api_key) = &self.api_key else {
            return Err(GenzsmartError::ProviderNotConfigured {
                provider: PROVIDER_ID.to_string(),
            });
        };

        let mut query_params: Vec<(&str, String)> = vec![
            ("q", query.to_string()),
            ("count", num_results.min(MAX_COUNT).to_string()),
        ];
        for key in FORWARDED_PARAMS {
            if let Some(value) = params.get(*key) {
                query_params.push((*key, value.clone()));
            }
        }

        let started = Instant::now();
        let response = self
            .client
            .get(self.endpoint(search_type))
            .header("X-Subscription-Token", api_key)
            .header("Accept", "application/json")
            .query(&query_params)
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER_ID, e))?;
        let response = check_status(PROVIDER_ID, response).await?;

        // Web results are nested under `web`; news and images are top-level.
        let items = match search_type {
            SearchType::General => read_json::<WebResponse>(PROVIDER_ID, response)
                .await?
                .web
                .unwrap_or_default()
                .results,
            SearchType::News | SearchType::Images => {
                read_json::<ResultList>(PROVIDER_ID, response).await?.results
            }
        };
        let elapsed = started.elapsed().as_secs_f64();

        let results: Vec<SearchResult> = items
            .into_iter()
            .take(num_results)
            .map(BraveItem::into_result)
            .collect();
        debug!(query, count = results.len(), %search_type, "Brave search complete");

        Ok(SearchResponse::new(query, PROVIDER_ID, results, elapsed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn brave(server: &MockServer) -> BraveSearch {
        BraveSearch::new(Some("brave-token".into()), Duration::from_secs(5))
            .unwrap()
            .with_base_url(server.uri())
    }

    #[tokio::test]
    async fn web_search_maps_results_and_caps_count() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/web/search"))
            .and(header("X-Subscription-Token", "brave-token"))
            .and(query_param("q", "rust ownership"))
            .and(query_param("count", "20"))
            .and(query_param("freshness", "pw"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "web": {"results": [
                    {
                        "title": "Ownership - The Rust Book",
                        "url": "https://doc.rust-lang.org/book/ch04-01-what-is-ownership.html",
                        "description": "Ownership is a set of rules...",
                        "age": "2 days ago",
                        "meta_url": {"hostname": "doc.rust-lang.org"}
                    },
                    {
                        "title": "No meta",
                        "url": "https://www.example.com/page",
                        "description": "fallback"
                    }
                ]}
            })))
            .mount(&server)
            .await;

        let mut params = SearchParams::new();
        params.insert("freshness".into(), "pw".into());
        params.insert("ignored".into(), "x".into());
        let response = brave(&server)
            .search("rust ownership", 50, SearchType::General, &params)
            .await
            .unwrap();

        assert_eq!(response.provider, "brave");
        assert_eq!(response.total_results, 2);
        assert_eq!(response.results[0].source, "doc.rust-lang.org");
        assert_eq!(response.results[0].published_date.as_deref(), Some("2 days ago"));
        assert_eq!(response.results[1].source, "example.com");
        assert!(!response.cached);
    }

    #[tokio::test]
    async fn image_search_keeps_thumbnails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/images/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [{
                    "title": "Ferris",
                    "url": "https://rustacean.net/",
                    "source": "rustacean.net",
                    "thumbnail": {"src": "https://imgs.search.brave.com/ferris.png"}
                }]
            })))
            .mount(&server)
            .await;

        let response = brave(&server)
            .search("ferris crab", 3, SearchType::Images, &SearchParams::new())
            .await
            .unwrap();
        assert_eq!(
            response.results[0].thumbnail.as_deref(),
            Some("https://imgs.search.brave.com/ferris.png")
        );
    }

    #[tokio::test]
    async fn rate_limit_is_distinct() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "1"))
            .mount(&server)
            .await;

        let err = brave(&server)
            .search("q", 5, SearchType::News, &SearchParams::new())
            .await
            .unwrap_err();
        assert!(matches!(err, GenzsmartError::RateLimit { .. }));
    }

    #[tokio::test]
    async fn missing_key_fails_without_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let provider = BraveSearch::new(Some("  ".into()), Duration::from_secs(5))
            .unwrap()
            .with_base_url(server.uri());
        assert!(!provider.is_available());
        let err = provider
            .search("q", 5, SearchType::General, &SearchParams::new())
            .await
            .unwrap_err();
        assert!(matches!(err, GenzsmartError::ProviderNotConfigured { .. }));
    }
}
