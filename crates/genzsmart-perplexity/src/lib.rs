// SPDX-FileCopyrightText: 2026 GenzSmart Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Perplexity provider adapter for GenzSmart.
//!
//! Perplexity speaks the Chat Completions wire format, so this adapter rides
//! on [`genzsmart_openai::ChatClient`]. What it adds is the `citations`
//! array, copied into [`ChatCompletionResponse::metadata`], and a one-shot
//! [`PerplexityProvider::ask`] for grounded answers.

use std::time::Duration;

use async_trait::async_trait;
use genzsmart_config::ProviderConfig;
use genzsmart_core::error::GenzsmartError;
use genzsmart_core::traits::{ChunkStream, PluginAdapter, ProviderAdapter};
use genzsmart_core::types::{
    AdapterType, ChatCompletionRequest, ChatCompletionResponse, ConnectionStatus, HealthStatus,
    Message, Metadata, ProviderModel, TokenUsage,
};
use genzsmart_openai::types::ChatResponse;
use genzsmart_openai::{
    ChatClient, ClientSettings, into_completion, normalize_chat_stream, to_chat_request,
};
use serde::Serialize;
use tracing::{debug, info};

pub const PROVIDER_ID: &str = "perplexity";
pub const DEFAULT_BASE_URL: &str = "https://api.perplexity.ai";
pub const DEFAULT_MODEL: &str = "llama-3.1-sonar-large-128k-online";

const API_KEY_ENV_VARS: &[&str] = &["PERPLEXITY_API_KEY"];
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const ASK_SYSTEM_PROMPT: &str = "Be precise and concise.";
const ASK_TEMPERATURE: f32 = 0.2;

/// Static Perplexity catalog.
pub fn catalog() -> Vec<ProviderModel> {
    vec![
        ProviderModel::new(
            "llama-3.1-sonar-large-128k-online",
            "Sonar Large (Online)",
            8192,
            false,
        ),
        ProviderModel::new(
            "llama-3.1-sonar-small-128k-online",
            "Sonar Small (Online)",
            8192,
            false,
        ),
        ProviderModel::new(
            "llama-3.1-sonar-large-128k-chat",
            "Sonar Large (Chat)",
            8192,
            false,
        ),
        ProviderModel::new("llama-3.1-8b-instruct", "Llama 3.1 8B", 8192, false),
    ]
}

/// A grounded answer from an online model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerplexityAnswer {
    pub answer: String,
    pub citations: Vec<String>,
    pub model: String,
    pub usage: TokenUsage,
}

pub struct PerplexityProvider {
    client: ChatClient,
    default_model: String,
}

impl PerplexityProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self, GenzsmartError> {
        let api_key = config.resolve_api_key(PROVIDER_ID, API_KEY_ENV_VARS)?;
        let client = ChatClient::new(ClientSettings {
            provider: PROVIDER_ID.to_string(),
            api_key,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout: REQUEST_TIMEOUT,
            extra_headers: Vec::new(),
        })?;
        let default_model = config
            .default_model
            .clone()
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        info!(model = %default_model, "Perplexity provider initialized");

        Ok(Self {
            client,
            default_model,
        })
    }

    #[cfg(test)]
    fn with_fast_retry(mut self) -> Self {
        self.client = self.client.with_retry_delay(Duration::from_millis(10));
        self
    }

    /// Asks an online model a single question and returns its answer with sources.
    ///
    /// `model` defaults to the large online Sonar model regardless of the
    /// configured default, since chat-only models return no citations.
    pub async fn ask(
        &self,
        query: &str,
        model: Option<&str>,
    ) -> Result<PerplexityAnswer, GenzsmartError> {
        let request = ChatCompletionRequest::new(
            model.unwrap_or(DEFAULT_MODEL),
            vec![Message::system(ASK_SYSTEM_PROMPT), Message::user(query)],
        )
        .with_temperature(ASK_TEMPERATURE);
        let body = to_chat_request(&request, &self.default_model);

        let response = self.client.complete(&body).await.map_err(|e| match e {
            GenzsmartError::Provider { message, source } => GenzsmartError::Provider {
                message: format!("Search failed: {message}"),
                source,
            },
            other => other,
        })?;

        let citations = citation_list(&response);
        let completion = into_completion(&response, &body.model);
        Ok(PerplexityAnswer {
            answer: completion.content,
            citations,
            model: completion.model,
            usage: completion.usage,
        })
    }
}

fn citation_metadata(response: &ChatResponse) -> Option<Metadata> {
    let citations = response.extra.get("citations")?;
    let mut metadata = Metadata::new();
    metadata.insert("citations".to_string(), citations.clone());
    Some(metadata)
}

fn citation_list(response: &ChatResponse) -> Vec<String> {
    response
        .extra
        .get("citations")
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

#[async_trait]
impl PluginAdapter for PerplexityProvider {
    fn name(&self) -> &str {
        PROVIDER_ID
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, GenzsmartError> {
        Ok(match self.validate_connection().await.error {
            None => HealthStatus::Healthy,
            Some(e) => HealthStatus::Unhealthy(e),
        })
    }
}

#[async_trait]
impl ProviderAdapter for PerplexityProvider {
    fn provider_id(&self) -> &str {
        PROVIDER_ID
    }

    fn provider_name(&self) -> &str {
        "Perplexity"
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    fn models(&self) -> Vec<ProviderModel> {
        catalog()
    }

    async fn complete(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, GenzsmartError> {
        let body = to_chat_request(&request, &self.default_model);
        let response = self.client.complete(&body).await?;
        let mut completion = into_completion(&response, &body.model);
        completion.metadata = citation_metadata(&response);
        Ok(completion)
    }

    async fn stream(&self, request: ChatCompletionRequest) -> Result<ChunkStream, GenzsmartError> {
        let body = to_chat_request(&request, &self.default_model);
        let chunks = self.client.stream(&body).await?;
        Ok(normalize_chat_stream(chunks))
    }

    async fn validate_connection(&self) -> ConnectionStatus {
        let probe = to_chat_request(
            &ChatCompletionRequest::new(self.default_model.clone(), vec![Message::user("Hi")])
                .with_max_tokens(1),
            &self.default_model,
        );

        match self.client.probe(&probe).await {
            Ok(status) if status.is_success() => ConnectionStatus::valid(),
            Ok(status) if status.as_u16() == 401 => ConnectionStatus::invalid("Invalid API key"),
            Ok(status) => ConnectionStatus::invalid(format!("HTTP {}", status.as_u16())),
            Err(e) => {
                debug!(error = %e, "Perplexity connection check failed");
                ConnectionStatus::invalid(e.to_string())
            }
        }
    }
}
