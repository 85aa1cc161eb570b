// SPDX-FileCopyrightText: 2026 GenzSmart Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Anthropic Claude provider adapter for GenzSmart.
//!
//! This crate implements [`ProviderAdapter`] for the Anthropic Messages API,
//! providing both single-shot completion and streaming SSE responses.

pub mod client;
pub mod sse;
pub mod types;

use async_trait::async_trait;
use futures::stream::StreamExt;
use genzsmart_config::ProviderConfig;
use genzsmart_core::error::GenzsmartError;
use genzsmart_core::stream::{DEFAULT_FINISH_REASON, normalize_stream};
use genzsmart_core::traits::{ChunkStream, PluginAdapter, ProviderAdapter};
use genzsmart_core::types::{
    AdapterType, ChatCompletionRequest, ChatCompletionResponse, ConnectionStatus, HealthStatus,
    Message, MessageRole, ProviderModel, StreamChunk, TokenUsage,
};
use tracing::{debug, info};

use crate::client::ClaudeClient;
use crate::sse::StreamEvent;
use crate::types::{ApiMessage, MessageRequest, ResponseContentBlock, SseDelta};

/// Registry identifier of this provider.
pub const PROVIDER_ID: &str = "claude";

/// Model used when neither the request nor the config names one.
pub const DEFAULT_MODEL: &str = "claude-3-sonnet-20240229";

/// Claude requires `max_tokens`; this is sent when the request leaves it unset.
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Environment variables consulted, in order, when the config has no key.
const API_KEY_ENV_VARS: &[&str] = &["CLAUDE_API_KEY", "ANTHROPIC_API_KEY"];

/// Anthropic Claude provider implementing [`ProviderAdapter`].
///
/// API key resolution order: config, `CLAUDE_API_KEY`, `ANTHROPIC_API_KEY`.
pub struct ClaudeProvider {
    client: ClaudeClient,
    default_model: String,
}

impl ClaudeProvider {
    /// Creates a new Claude provider from its `[providers.claude]` table.
    ///
    /// Fails with [`GenzsmartError::ProviderNotConfigured`] before any network
    /// I/O when no API key can be resolved.
    pub fn new(config: &ProviderConfig) -> Result<Self, GenzsmartError> {
        let api_key = config.resolve_api_key(PROVIDER_ID, API_KEY_ENV_VARS)?;
        let client = ClaudeClient::new(&api_key, config.base_url.as_deref())?;
        let default_model = config
            .default_model
            .clone()
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        info!(model = %default_model, "Claude provider initialized");

        Ok(Self {
            client,
            default_model,
        })
    }

    /// Converts a [`ChatCompletionRequest`] to a Claude [`MessageRequest`].
    ///
    /// System-role messages are lifted into the `system` field; an explicit
    /// `system_prompt` on the request replaces them.
    fn to_message_request(&self, request: &ChatCompletionRequest) -> MessageRequest {
        let messages = request
            .messages
            .iter()
            .filter(|m| m.role != MessageRole::System)
            .map(|m| ApiMessage {
                role: api_role(m.role).to_string(),
                content: m.content.clone(),
            })
            .collect();

        let system = request
            .system_prompt
            .clone()
            .or_else(|| joined_system_messages(&request.messages));

        let model = if request.model.is_empty() {
            self.default_model.clone()
        } else {
            request.model.clone()
        };

        MessageRequest {
            model,
            messages,
            system,
            max_tokens: request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            temperature: request.clamped_temperature(),
            stream: request.stream,
        }
    }
}

/// Claude only knows `user` and `assistant`; tool output is fed back as user text.
fn api_role(role: MessageRole) -> &'static str {
    match role {
        MessageRole::Assistant => "assistant",
        MessageRole::User | MessageRole::Tool | MessageRole::System => "user",
    }
}

fn joined_system_messages(messages: &[Message]) -> Option<String> {
    let parts: Vec<&str> = messages
        .iter()
        .filter(|m| m.role == MessageRole::System)
        .map(|m| m.content.as_str())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n\n"))
    }
}

/// Static Claude catalog.
pub fn catalog() -> Vec<ProviderModel> {
    vec![
        ProviderModel::new("claude-3-opus-20240229", "Claude 3 Opus", 4096, true),
        ProviderModel::new("claude-3-sonnet-20240229", "Claude 3 Sonnet", 4096, true),
        ProviderModel::new("claude-3-haiku-20240307", "Claude 3 Haiku", 4096, true),
    ]
}

#[async_trait]
impl PluginAdapter for ClaudeProvider {
    fn name(&self) -> &str {
        PROVIDER_ID
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, GenzsmartError> {
        let status = self.validate_connection().await;
        Ok(match status.error {
            None => HealthStatus::Healthy,
            Some(e) => HealthStatus::Unhealthy(e),
        })
    }
}

#[async_trait]
impl ProviderAdapter for ClaudeProvider {
    fn provider_id(&self) -> &str {
        PROVIDER_ID
    }

    fn provider_name(&self) -> &str {
        "Anthropic Claude"
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
        let api_request = self.to_message_request(&request);
        let response = self.client.complete_message(&api_request).await?;

        let content = response
            .content
            .iter()
            .filter_map(|block| match block {
                ResponseContentBlock::Text { text } => Some(text.as_str()),
                ResponseContentBlock::Other => None,
            })
            .collect::<String>();

        Ok(ChatCompletionResponse {
            content,
            model: response.model,
            finish_reason: response
                .stop_reason
                .unwrap_or_else(|| DEFAULT_FINISH_REASON.to_string()),
            usage: TokenUsage::new(response.usage.input_tokens, response.usage.output_tokens),
            metadata: None,
        })
    }

    async fn stream(&self, request: ChatCompletionRequest) -> Result<ChunkStream, GenzsmartError> {
        let api_request = self.to_message_request(&request);
        let event_stream = self.client.stream_message(&api_request).await?;

        let mut state = StreamState::default();
        let chunks = event_stream.filter_map(move |result| {
            let chunk = match result {
                Ok(event) => state.map_event(event),
                Err(e) => Some(Err(e)),
            };
            async move { chunk }
        });

        Ok(normalize_stream(chunks))
    }

    async fn validate_connection(&self) -> ConnectionStatus {
        let probe = ChatCompletionRequest::new(
            self.default_model.clone(),
            vec![Message::user("Hi")],
        )
        .with_max_tokens(1);

        match self.client.complete_message(&self.to_message_request(&probe)).await {
            Ok(_) => ConnectionStatus::valid(),
            Err(GenzsmartError::ProviderNotConfigured { .. }) => {
                ConnectionStatus::invalid("Invalid API key")
            }
            Err(e) => {
                debug!(error = %e, "Claude connection check failed");
                ConnectionStatus::invalid(e.to_string())
            }
        }
    }
}

/// Usage and stop reason accumulated across SSE events; Claude reports them
/// before `message_stop`, which is where the terminal chunk is emitted.
#[derive(Debug, Default)]
struct StreamState {
    prompt_tokens: u32,
    completion_tokens: u32,
    stop_reason: Option<String>,
}

impl StreamState {
    fn map_event(&mut self, event: StreamEvent) -> Option<Result<StreamChunk, GenzsmartError>> {
        match event {
            StreamEvent::MessageStart(start) => {
                self.prompt_tokens = start.message.usage.input_tokens;
                None
            }
            StreamEvent::ContentBlockDelta(delta) => match delta.delta {
                SseDelta::TextDelta { text } => Some(Ok(StreamChunk::delta(text))),
                SseDelta::Other => None,
            },
            StreamEvent::MessageDelta(delta) => {
                if let Some(reason) = delta.delta.stop_reason {
                    self.stop_reason = Some(reason);
                }
                if let Some(usage) = delta.usage {
                    self.completion_tokens = usage.output_tokens;
                }
                None
            }
            StreamEvent::MessageStop => Some(Ok(StreamChunk::terminal(
                self.stop_reason
                    .take()
                    .unwrap_or_else(|| DEFAULT_FINISH_REASON.to_string()),
                Some(TokenUsage::new(self.prompt_tokens, self.completion_tokens)),
            ))),
            StreamEvent::Error(err) => Some(Err(GenzsmartError::provider(format!(
                "{}: {}",
                err.error.type_, err.error.message
            )))),
            StreamEvent::Ping => None,
        }
    }
}
