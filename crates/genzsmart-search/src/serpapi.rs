// SPDX-FileCopyrightText: 2026 GenzSmart Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SerpAPI (Google results) adapter.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use genzsmart_core::error::GenzsmartError;
use genzsmart_core::traits::{PluginAdapter, SearchParams, SearchProvider};
use genzsmart_core::types::{AdapterType, HealthStatus, SearchResponse, SearchResult, SearchType};
use serde::Deserialize;
use tracing::debug;

use crate::http::{build_client, check_status, read_json, transport_error};

pub const PROVIDER_ID: &str = "serpapi";
pub const DEFAULT_BASE_URL: &str = "https://serpapi.com/search";

const MAX_NUM: usize = 100;
const DEFAULT_ENGINE: &str = "google";

pub struct SerpApiSearch {
    client: reqwest::Client,
    api_key: Option<String>,
    endpoint: String,
}

impl SerpApiSearch {
    pub fn new(api_key: Option<String>, timeout: Duration) -> Result<Self, GenzsmartError> {
        Ok(Self {
            client: build_client(PROVIDER_ID, timeout)?,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            endpoint: DEFAULT_BASE_URL.to_string(),
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[derive(Debug, Default, Deserialize)]
struct SerpResponse {
    #[serde(default)]
    organic_results: Vec<SerpItem>,
    #[serde(default)]
    news_results: Vec<SerpItem>,
    #[serde(default)]
    images_results: Vec<SerpItem>,
    #[serde(default)]
    answer_box: Option<AnswerBox>,
}

#[derive(Debug, Default, Deserialize)]
struct SerpItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    original: Option<String>,
    #[serde(default)]
    snippet: String,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    thumbnail: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct AnswerBox {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    snippet: Option<String>,
    #[serde(default)]
    answer: Option<String>,
}

fn into_results(data: SerpResponse, search_type: SearchType, limit: usize) -> Vec<SearchResult> {
    let (items, default_source) = match search_type {
        SearchType::General => (data.organic_results, "Google"),
        SearchType::News => (data.news_results, "Unknown"),
        SearchType::Images => (data.images_results, "Unknown"),
    };

    let mut results: Vec<SearchResult> = items
        .into_iter()
        .take(limit)
        .map(|item| SearchResult {
            url: match search_type {
                SearchType::Images => item.original.unwrap_or(item.link),
                _ => item.link,
            },
            title: item.title,
            snippet: item.snippet,
            source: item.source.unwrap_or_else(|| default_source.to_string()),
            published_date: match search_type {
                SearchType::Images => None,
                _ => item.date,
            },
            thumbnail: match search_type {
                SearchType::General => None,
                _ => item.thumbnail,
            },
        })
        .collect();

    if results.is_empty()
        && search_type == SearchType::General
        && let Some(answer) = data.answer_box
    {
        results.push(SearchResult {
            title: answer.title.unwrap_or_else(|| "Answer".to_string()),
            url: answer.link.unwrap_or_default(),
            snippet: answer.snippet.or(answer.answer).unwrap_or_default(),
            source: "Google Answer Box".to_string(),
            published_date: None,
            thumbnail: None,
        });
    }
    results
}

#[async_trait]
impl PluginAdapter for SerpApiSearch {
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
            HealthStatus::Unhealthy("SERPAPI_API_KEY not configured".into())
        })
    }
}

#[async_trait]
impl SearchProvider for SerpApiSearch {
    fn provider_id(&self) -> &str {
        PROVIDER_ID
    }

    fn provider_name(&self) -> &str {
        "SerpAPI (Google)"
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

        let mut query_params: Vec<(String, String)> = vec![
            ("q".into(), query.to_string()),
            ("api_key".into(), api_key.clone()),
            ("engine".into(), DEFAULT_ENGINE.into()),
            ("num".into(), num_results.min(MAX_NUM).to_string()),
        ];
        match search_type {
            SearchType::News => query_params.push(("tbm".into(), "nws".into())),
            SearchType::Images => query_params.push(("tbm".into(), "isch".into())),
            SearchType::General => {}
        }
        // Caller parameters win over the defaults above (e.g. `engine=bing`).
        for (key, value) in params {
            query_params.retain(|(k, _)| k != key);
            query_params.push((key.clone(), value.clone()));
        }

        let started = Instant::now();
        let response = self
            .client
            .get(&self.endpoint)
            .query(&query_params)
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER_ID, e))?;
        let response = check_status(PROVIDER_ID, response).await?;
        let data: SerpResponse = read_json(PROVIDER_ID, response).await?;
        let elapsed = started.elapsed().as_secs_f64();

        let results = into_results(data, search_type, num_results);
        debug!(query, count = results.len(), %search_type, "SerpAPI search complete");

        Ok(SearchResponse::new(query, PROVIDER_ID, results, elapsed))
    }
}
