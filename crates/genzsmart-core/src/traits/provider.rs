// SPDX-FileCopyrightText: 2026 GenzSmart Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider adapter trait for LLM vendor integrations.

use std::pin::Pin;

use async_trait::async_trait;
use futures_core::Stream;

use crate::error::GenzsmartError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{
    ChatCompletionRequest, ChatCompletionResponse, ConnectionStatus, ProviderModel, StreamChunk,
};

/// A finite, non-restartable sequence of streamed chunks.
///
/// Dropping the stream releases the underlying network connection.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<StreamChunk, GenzsmartError>> + Send>>;

/// Normalized interface to one AI-completion backend.
#[async_trait]
pub trait ProviderAdapter: PluginAdapter {
    /// Stable identifier (`openai`, `claude`, ...).
    fn provider_id(&self) -> &str;

    /// Human-readable vendor name.
    fn provider_name(&self) -> &str;

    /// Model used when the caller does not pick one.
    fn default_model(&self) -> &str;

    /// Static model catalog. Never touches the network.
    fn models(&self) -> Vec<ProviderModel>;

    /// Sends a completion request and returns the full response.
    async fn complete(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, GenzsmartError>;

    /// Sends a completion request and returns a normalized chunk stream.
    async fn stream(&self, request: ChatCompletionRequest) -> Result<ChunkStream, GenzsmartError>;

    /// Checks the configured credential against the vendor.
    async fn validate_connection(&self) -> ConnectionStatus;
}
