// SPDX-FileCopyrightText: 2026 GenzSmart Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock completion provider for deterministic testing.
//!
//! `MockProvider` returns pre-configured replies from a FIFO queue and records
//! every request it receives. When the queue is empty, "mock response" is
//! returned.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream;
use tokio::sync::Mutex;

use genzsmart_core::{
    AdapterType, ChatCompletionRequest, ChatCompletionResponse, ChunkStream, ConnectionStatus,
    GenzsmartError, HealthStatus, PluginAdapter, ProviderAdapter, ProviderModel, StreamChunk,
    TokenUsage, normalize_stream,
};

pub const MOCK_PROVIDER_ID: &str = "mock";
pub const MOCK_MODEL: &str = "mock-model";

type Reply = Result<String, GenzsmartError>;

pub struct MockProvider {
    replies: Arc<Mutex<VecDeque<Reply>>>,
    requests: Arc<Mutex<Vec<ChatCompletionRequest>>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_responses(responses: Vec<String>) -> Self {
        let provider = Self::new();
        if let Ok(mut replies) = provider.replies.try_lock() {
            replies.extend(responses.into_iter().map(Ok));
        }
        provider
    }

    pub async fn add_response(&self, text: impl Into<String>) {
        self.replies.lock().await.push_back(Ok(text.into()));
    }

    /// Queues a failure for the next call.
    pub async fn add_error(&self, error: GenzsmartError) {
        self.replies.lock().await.push_back(Err(error));
    }

    /// Every request received so far, in order.
    pub async fn requests(&self) -> Vec<ChatCompletionRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.requests.lock().await.len()
    }

    async fn next_reply(&self, request: ChatCompletionRequest) -> Reply {
        self.requests.lock().await.push(request);
        self.replies
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok("mock response".to_string()))
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn usage_for(text: &str) -> TokenUsage {
    TokenUsage::new(10, text.split_whitespace().count() as u32)
}

#[async_trait]
impl PluginAdapter for MockProvider {
    fn name(&self) -> &str {
        MOCK_PROVIDER_ID
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, GenzsmartError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl ProviderAdapter for MockProvider {
    fn provider_id(&self) -> &str {
        MOCK_PROVIDER_ID
    }

    fn provider_name(&self) -> &str {
        "Mock Provider"
    }

    fn default_model(&self) -> &str {
        MOCK_MODEL
    }

    fn models(&self) -> Vec<ProviderModel> {
        vec![ProviderModel::new(MOCK_MODEL, "Mock Model", 4096, false)]
    }

    async fn complete(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, GenzsmartError> {
        let model = request.model.clone();
        let text = self.next_reply(request).await?;
        Ok(ChatCompletionResponse {
            usage: usage_for(&text),
            content: text,
            model,
            finish_reason: "stop".to_string(),
            metadata: None,
        })
    }

    /// Streams the reply word by word (whitespace kept with the preceding
    /// word), so the concatenated deltas equal the non-streaming content.
    async fn stream(&self, request: ChatCompletionRequest) -> Result<ChunkStream, GenzsmartError> {
        let text = self.next_reply(request).await?;
        let usage = usage_for(&text);
        let mut chunks: Vec<Result<StreamChunk, GenzsmartError>> = text
            .split_inclusive(char::is_whitespace)
            .map(|piece| Ok(StreamChunk::delta(piece)))
            .collect();
        chunks.push(Ok(StreamChunk::terminal("stop", Some(usage))));
        Ok(normalize_stream(stream::iter(chunks)))
    }

    async fn validate_connection(&self) -> ConnectionStatus {
        ConnectionStatus::valid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use genzsmart_core::Message;

    fn request() -> ChatCompletionRequest {
        ChatCompletionRequest::new("test-model", vec![Message::user("hi")])
    }

    #[tokio::test]
    async fn queued_responses_returned_in_order() {
        let provider = MockProvider::with_responses(vec!["first".into(), "second".into()]);
        assert_eq!(provider.complete(request()).await.unwrap().content, "first");
        assert_eq!(provider.complete(request()).await.unwrap().content, "second");
        assert_eq!(provider.complete(request()).await.unwrap().content, "mock response");
        assert_eq!(provider.call_count().await, 3);
    }

    #[tokio::test]
    async fn queued_error_is_returned_once() {
        let provider = MockProvider::new();
        provider.add_error(GenzsmartError::provider("boom")).await;
        assert!(provider.complete(request()).await.is_err());
        assert!(provider.complete(request()).await.is_ok());
    }

    #[tokio::test]
    async fn stream_concatenation_matches_complete() {
        let text = "Ownership rules  keep memory safe.";
        let provider = MockProvider::with_responses(vec![text.into(), text.into()]);

        let complete = provider.complete(request()).await.unwrap().content;
        let chunks: Vec<StreamChunk> = provider
            .stream(request())
            .await
            .unwrap()
            .map(|c| c.unwrap())
            .collect()
            .await;

        let streamed: String = chunks
            .iter()
            .filter(|c| !c.is_finished)
            .map(|c| c.content.as_str())
            .collect();
        assert_eq!(streamed, complete);
        assert_eq!(chunks.iter().filter(|c| c.is_finished).count(), 1);
        assert!(chunks.last().unwrap().is_finished);
    }
}
