// SPDX-FileCopyrightText: 2026 GenzSmart Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI-compatible provider adapters for GenzSmart.
//!
//! OpenAI, DeepSeek, Grok and OpenRouter all speak the Chat Completions wire
//! format. They share one [`ChatClient`] and differ only in the
//! [`OpenAiFlavor`] that supplies base URL, default model, credentials and
//! model catalog.
//!
//! The conversion helpers ([`to_chat_request`], [`map_chunk`],
//! [`into_completion`]) are public so other OpenAI-style vendors can reuse them.

pub mod client;
pub mod sse;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use genzsmart_config::ProviderConfig;
use genzsmart_core::error::GenzsmartError;
use genzsmart_core::stream::{DEFAULT_FINISH_REASON, normalize_stream};
use genzsmart_core::traits::{ChunkStream, PluginAdapter, ProviderAdapter};
use genzsmart_core::types::{
    AdapterType, ChatCompletionRequest, ChatCompletionResponse, ConnectionStatus, HealthStatus,
    ProviderModel, StreamChunk, TokenUsage,
};
use strum::{Display, EnumString};
use tracing::{debug, info};

pub use crate::client::{ChatClient, ClientSettings};
use crate::types::{ChatChunk, ChatMessage, ChatRequest, ChatResponse};

/// Request timeout for the OpenAI-compatible vendors.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Vendors served by [`OpenAiCompatibleProvider`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum OpenAiFlavor {
    OpenAi,
    DeepSeek,
    Grok,
    OpenRouter,
}

impl OpenAiFlavor {
    pub const ALL: [OpenAiFlavor; 4] = [
        OpenAiFlavor::OpenAi,
        OpenAiFlavor::DeepSeek,
        OpenAiFlavor::Grok,
        OpenAiFlavor::OpenRouter,
    ];

    /// Registry identifier.
    pub fn id(self) -> &'static str {
        match self {
            OpenAiFlavor::OpenAi => "openai",
            OpenAiFlavor::DeepSeek => "deepseek",
            OpenAiFlavor::Grok => "grok",
            OpenAiFlavor::OpenRouter => "openrouter",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            OpenAiFlavor::OpenAi => "OpenAI",
            OpenAiFlavor::DeepSeek => "DeepSeek",
            OpenAiFlavor::Grok => "xAI Grok",
            OpenAiFlavor::OpenRouter => "OpenRouter",
        }
    }

    pub fn default_base_url(self) -> &'static str {
        match self {
            OpenAiFlavor::OpenAi => "https://api.openai.com/v1",
            OpenAiFlavor::DeepSeek => "https://api.deepseek.com/v1",
            OpenAiFlavor::Grok => "https://api.x.ai/v1",
            OpenAiFlavor::OpenRouter => "https://openrouter.ai/api/v1",
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            OpenAiFlavor::OpenAi => "gpt-4",
            OpenAiFlavor::DeepSeek => "deepseek-chat",
            OpenAiFlavor::Grok => "grok-beta",
            OpenAiFlavor::OpenRouter => "openai/gpt-4",
        }
    }

    /// Environment variables consulted, in order, when the config has no key.
    pub fn api_key_env_vars(self) -> &'static [&'static str] {
        match self {
            OpenAiFlavor::OpenAi => &["OPENAI_API_KEY"],
            OpenAiFlavor::DeepSeek => &["DEEPSEEK_API_KEY"],
            OpenAiFlavor::Grok => &["GROK_API_KEY", "XAI_API_KEY"],
            OpenAiFlavor::OpenRouter => &["OPENROUTER_API_KEY"],
        }
    }

    /// OpenRouter attributes traffic through these optional headers.
    fn extra_headers(self) -> Vec<(&'static str, String)> {
        match self {
            OpenAiFlavor::OpenRouter => vec![
                ("http-referer", "https://github.com/genzsmart/genzsmart".to_string()),
                ("x-title", "GenzSmart".to_string()),
            ],
            _ => Vec::new(),
        }
    }

    /// Static model catalog.
    pub fn catalog(self) -> Vec<ProviderModel> {
        match self {
            OpenAiFlavor::OpenAi => vec![
                ProviderModel::new("gpt-4", "GPT-4", 8192, true),
                ProviderModel::new("gpt-4-turbo", "GPT-4 Turbo", 128_000, true),
                ProviderModel::new("gpt-3.5-turbo", "GPT-3.5 Turbo", 16_385, false),
            ],
            OpenAiFlavor::DeepSeek => vec![
                ProviderModel::new("deepseek-chat", "DeepSeek Chat", 32_768, false),
                ProviderModel::new("deepseek-coder", "DeepSeek Coder", 16_384, false),
            ],
            OpenAiFlavor::Grok => vec![
                ProviderModel::new("grok-beta", "Grok Beta", 131_072, false),
                ProviderModel::new("grok-vision-beta", "Grok Vision Beta", 8192, true),
            ],
            OpenAiFlavor::OpenRouter => vec![
                ProviderModel::new("openai/gpt-4", "GPT-4 (via OpenRouter)", 8192, true),
                ProviderModel::new(
                    "anthropic/claude-3-opus",
                    "Claude 3 Opus (via OpenRouter)",
                    4096,
                    true,
                ),
                ProviderModel::new(
                    "meta-llama/llama-3.1-70b-instruct",
                    "Llama 3.1 70B (via OpenRouter)",
                    131_072,
                    false,
                ),
                ProviderModel::new(
                    "google/gemini-pro-1.5",
                    "Gemini Pro 1.5 (via OpenRouter)",
                    8192,
                    true,
                ),
            ],
        }
    }
}

/// Provider adapter for any [`OpenAiFlavor`].
pub struct OpenAiCompatibleProvider {
    flavor: OpenAiFlavor,
    client: ChatClient,
    default_model: String,
}

impl OpenAiCompatibleProvider {
    /// Builds the adapter from the flavor's `[providers.<id>]` table.
    ///
    /// Fails with [`GenzsmartError::ProviderNotConfigured`] before any network
    /// I/O when no API key can be resolved.
    pub fn new(flavor: OpenAiFlavor, config: &ProviderConfig) -> Result<Self, GenzsmartError> {
        let api_key = config.resolve_api_key(flavor.id(), flavor.api_key_env_vars())?;
        let client = ChatClient::new(ClientSettings {
            provider: flavor.id().to_string(),
            api_key,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| flavor.default_base_url().to_string()),
            timeout: DEFAULT_TIMEOUT,
            extra_headers: flavor.extra_headers(),
        })?;
        let default_model = config
            .default_model
            .clone()
            .unwrap_or_else(|| flavor.default_model().to_string());

        info!(provider = flavor.id(), model = %default_model, "provider initialized");

        Ok(Self {
            flavor,
            client,
            default_model,
        })
    }

    pub fn flavor(&self) -> OpenAiFlavor {
        self.flavor
    }

    #[cfg(test)]
    fn with_fast_retry(mut self) -> Self {
        self.client = self.client.with_retry_delay(Duration::from_millis(10));
        self
    }
}

/// Converts a [`ChatCompletionRequest`] to the Chat Completions body.
///
/// `system_prompt` becomes the first `system` message; messages keep their
/// roles and order.
pub fn to_chat_request(request: &ChatCompletionRequest, default_model: &str) -> ChatRequest {
    let mut messages = Vec::with_capacity(request.messages.len() + 1);
    if let Some(prompt) = &request.system_prompt {
        messages.push(ChatMessage {
            role: "system".into(),
            content: prompt.clone(),
        });
    }
    messages.extend(request.messages.iter().map(|m| ChatMessage {
        role: m.role.to_string(),
        content: m.content.clone(),
    }));

    ChatRequest {
        model: if request.model.is_empty() {
            default_model.to_string()
        } else {
            request.model.clone()
        },
        messages,
        temperature: request.clamped_temperature(),
        max_tokens: request.max_tokens,
        stream: request.stream,
    }
}

/// Converts a full response, leaving vendor extensions in `response.extra`
/// for the caller.
pub fn into_completion(
    response: &ChatResponse,
    requested_model: &str,
) -> ChatCompletionResponse {
    let first = response.choices.first();
    let usage = response.usage.unwrap_or_default();
    ChatCompletionResponse {
        content: first
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default(),
        model: response
            .model
            .clone()
            .unwrap_or_else(|| requested_model.to_string()),
        finish_reason: first
            .and_then(|c| c.finish_reason.clone())
            .unwrap_or_else(|| DEFAULT_FINISH_REASON.to_string()),
        usage: TokenUsage {
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens.max(usage.prompt_tokens + usage.completion_tokens),
        },
        metadata: None,
    }
}

/// Maps one wire chunk to zero, one or two normalized chunks: the text
/// delta first, then the terminal chunk when `finish_reason` is set.
pub fn map_chunk(chunk: ChatChunk) -> Vec<Result<StreamChunk, GenzsmartError>> {
    let usage = chunk
        .usage
        .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens));
    let Some(choice) = chunk.choices.into_iter().next() else {
        return Vec::new();
    };

    let mut out = Vec::with_capacity(2);
    if let Some(text) = choice.delta.content
        && !text.is_empty()
    {
        out.push(Ok(StreamChunk::delta(text)));
    }
    if let Some(reason) = choice.finish_reason {
        out.push(Ok(StreamChunk::terminal(reason, usage)));
    }
    out
}

/// Turns a parsed chunk stream into a normalized [`ChunkStream`].
pub fn normalize_chat_stream<S>(chunks: S) -> ChunkStream
where
    S: futures::Stream<Item = Result<ChatChunk, GenzsmartError>> + Send + 'static,
{
    let flat = chunks.flat_map(|result| {
        let items = match result {
            Ok(chunk) => map_chunk(chunk),
            Err(e) => vec![Err(e)],
        };
        stream::iter(items)
    });
    normalize_stream(flat)
}

#[async_trait]
impl PluginAdapter for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        self.flavor.id()
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
impl ProviderAdapter for OpenAiCompatibleProvider {
    fn provider_id(&self) -> &str {
        self.flavor.id()
    }

    fn provider_name(&self) -> &str {
        self.flavor.display_name()
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    fn models(&self) -> Vec<ProviderModel> {
        self.flavor.catalog()
    }

    async fn complete(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, GenzsmartError> {
        let body = to_chat_request(&request, &self.default_model);
        let response = self.client.complete(&body).await?;
        Ok(into_completion(&response, &body.model))
    }

    async fn stream(&self, request: ChatCompletionRequest) -> Result<ChunkStream, GenzsmartError> {
        let body = to_chat_request(&request, &self.default_model);
        let chunks = self.client.stream(&body).await?;
        Ok(normalize_chat_stream(chunks))
    }

    async fn validate_connection(&self) -> ConnectionStatus {
        match self.client.list_models().await {
            Ok(()) => ConnectionStatus::valid(),
            Err(GenzsmartError::ProviderNotConfigured { .. }) => {
                ConnectionStatus::invalid("Invalid API key")
            }
            Err(e) => {
                debug!(provider = self.flavor.id(), error = %e, "connection check failed");
                ConnectionStatus::invalid(e.to_string())
            }
        }
    }
}
