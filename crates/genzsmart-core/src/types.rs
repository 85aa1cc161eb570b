// SPDX-FileCopyrightText: 2026 GenzSmart Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Normalized value types shared by every provider, search backend and the agent.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Free-form metadata attached to messages and responses.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a [`crate::PluginAdapter`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Provider,
    Search,
}

/// Author of a conversation message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
    Tool,
}

/// A single conversation message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl Message {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            metadata: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Sampling temperature used when a request does not set one.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// A vendor-neutral chat completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    pub messages: Vec<Message>,
    pub model: String,
    /// Sampling temperature in `[0, 2]`.
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub stream: bool,
    /// Overrides any system message in `messages` for vendors with a dedicated field.
    pub system_prompt: Option<String>,
}

impl ChatCompletionRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            messages,
            model: model.into(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: None,
            stream: false,
            system_prompt: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn streaming(mut self) -> Self {
        self.stream = true;
        self
    }

    /// Temperature clamped into the range every vendor accepts.
    pub fn clamped_temperature(&self) -> f32 {
        self.temperature.clamp(0.0, 2.0)
    }
}

/// Token accounting reported by a vendor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// A complete, non-streamed answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    pub content: String,
    pub model: String,
    pub finish_reason: String,
    pub usage: TokenUsage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

/// One increment of a streamed completion.
///
/// A normalized stream carries exactly one chunk with `is_finished == true`,
/// and it is the last item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamChunk {
    pub content: String,
    pub is_finished: bool,
    pub finish_reason: Option<String>,
    pub usage: Option<TokenUsage>,
}

impl StreamChunk {
    /// A non-terminal chunk carrying text.
    pub fn delta(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_finished: false,
            finish_reason: None,
            usage: None,
        }
    }

    /// The terminal chunk.
    pub fn terminal(finish_reason: impl Into<String>, usage: Option<TokenUsage>) -> Self {
        Self {
            content: String::new(),
            is_finished: true,
            finish_reason: Some(finish_reason.into()),
            usage,
        }
    }
}

/// Static catalog entry describing a model a provider can serve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderModel {
    pub id: String,
    pub name: String,
    pub max_tokens: u32,
    pub supports_vision: bool,
    pub supports_streaming: bool,
}

impl ProviderModel {
    pub fn new(id: &str, name: &str, max_tokens: u32, supports_vision: bool) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            max_tokens,
            supports_vision,
            supports_streaming: true,
        }
    }
}

/// Outcome of a credential check against a vendor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionStatus {
    pub valid: bool,
    pub error: Option<String>,
}

impl ConnectionStatus {
    pub fn valid() -> Self {
        Self {
            valid: true,
            error: None,
        }
    }

    pub fn invalid(error: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(error.into()),
        }
    }
}

/// Kind of web search to run.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    #[default]
    General,
    News,
    Images,
}

/// One normalized search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

/// A normalized response from a search backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    pub query: String,
    pub total_results: usize,
    /// Wall-clock seconds spent in the backend call.
    pub search_time: f64,
    pub provider: String,
    pub cached: bool,
    pub timestamp: DateTime<Utc>,
}

impl SearchResponse {
    pub fn new(query: &str, provider: &str, results: Vec<SearchResult>, search_time: f64) -> Self {
        Self {
            total_results: results.len(),
            results,
            query: query.to_string(),
            search_time,
            provider: provider.to_string(),
            cached: false,
            timestamp: Utc::now(),
        }
    }

    /// Renders the results as a plain-text block suitable for a model prompt.
    pub fn format_for_context(&self) -> String {
        let mut out = format!(
            "Web search results for: {}\nProvider: {}\n---\n",
            self.query, self.provider
        );
        for (i, result) in self.results.iter().enumerate() {
            let _ = writeln!(out, "\n{}. {}", i + 1, result.title);
            let _ = writeln!(out, "   Source: {}", result.source);
            let _ = writeln!(out, "   URL: {}", result.url);
            let _ = writeln!(out, "   {}", result.snippet);
            if let Some(published) = &result.published_date {
                let _ = writeln!(out, "   Published: {published}");
            }
        }
        out
    }
}
