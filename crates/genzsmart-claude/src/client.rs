// SPDX-FileCopyrightText: 2026 GenzSmart Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Anthropic Messages API.
//!
//! Provides [`ClaudeClient`] which handles request construction,
//! authentication, streaming SSE responses, and transient error retry.

use std::pin::Pin;
use std::time::Duration;

use futures::Stream;
use genzsmart_core::GenzsmartError;
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderValue, RETRY_AFTER};
use tracing::{debug, warn};

use crate::PROVIDER_ID;
use crate::sse::{self, StreamEvent};
use crate::types::{ApiErrorResponse, MessageRequest, MessageResponse};

/// Default API root. `/messages` is appended per request.
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";

/// API version sent in the `anthropic-version` header.
pub const API_VERSION: &str = "2023-06-01";

/// HTTP client for Anthropic API communication.
///
/// Retries once on transient upstream failures (500, 502, 503, 529).
/// Rate limits are surfaced immediately as [`GenzsmartError::RateLimit`].
#[derive(Debug, Clone)]
pub struct ClaudeClient {
    client: reqwest::Client,
    max_retries: u32,
    retry_delay: Duration,
    base_url: String,
}

impl ClaudeClient {
    /// Creates a new client with auth headers installed as defaults.
    pub fn new(api_key: &str, base_url: Option<&str>) -> Result<Self, GenzsmartError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(api_key).map_err(|e| {
                GenzsmartError::Config(format!("invalid API key header value: {e}"))
            })?,
        );
        headers.insert("anthropic-version", HeaderValue::from_static(API_VERSION));
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| GenzsmartError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            max_retries: 1,
            retry_delay: Duration::from_secs(1),
            base_url: base_url
                .unwrap_or(DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
        })
    }

    /// Shortens the retry delay (for tests against wiremock).
    #[cfg(test)]
    pub(crate) fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Sends a non-streaming request and returns the full response.
    pub async fn complete_message(
        &self,
        request: &MessageRequest,
    ) -> Result<MessageResponse, GenzsmartError> {
        let mut req = request.clone();
        req.stream = false;

        let response = self.send(&req).await?;
        let body = response.text().await.map_err(|e| GenzsmartError::Provider {
            message: format!("failed to read response body: {e}"),
            source: Some(Box::new(e)),
        })?;
        serde_json::from_str(&body).map_err(|e| GenzsmartError::Provider {
            message: format!("failed to parse API response: {e}"),
            source: Some(Box::new(e)),
        })
    }

    /// Sends a streaming request and returns a stream of SSE events.
    pub async fn stream_message(
        &self,
        request: &MessageRequest,
    ) -> Result<Pin<Box<dyn Stream<Item = Result<StreamEvent, GenzsmartError>> + Send>>, GenzsmartError>
    {
        let mut req = request.clone();
        req.stream = true;

        let response = self.send(&req).await?;
        Ok(sse::parse_sse_stream(response))
    }

    /// POSTs to `/messages`, retrying transient failures.
    async fn send(&self, request: &MessageRequest) -> Result<reqwest::Response, GenzsmartError> {
        let url = format!("{}/messages", self.base_url);

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, "retrying Claude request after transient error");
                tokio::time::sleep(self.retry_delay).await;
            }

            let response = self
                .client
                .post(&url)
                .json(request)
                .send()
                .await
                .map_err(|e| GenzsmartError::Provider {
                    message: format!("HTTP request failed: {e}"),
                    source: Some(Box::new(e)),
                })?;

            let status = response.status();
            debug!(status = %status, attempt, stream = request.stream, "Claude response received");

            if status.is_success() {
                return Ok(response);
            }

            if is_transient_error(status) && attempt < self.max_retries {
                let body = response.text().await.unwrap_or_default();
                warn!(status = %status, body = %body, "transient error, will retry");
                continue;
            }

            return Err(error_from_response(response).await);
        }

        Err(GenzsmartError::provider("Claude request failed after retries"))
    }
}

/// Maps a non-success response into the error taxonomy.
async fn error_from_response(response: reqwest::Response) -> GenzsmartError {
    let status = response.status();
    let retry_after = response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs);
    let body = response.text().await.unwrap_or_default();

    match status {
        StatusCode::TOO_MANY_REQUESTS => GenzsmartError::RateLimit {
            provider: PROVIDER_ID.to_string(),
            retry_after,
        },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            warn!(status = %status, body = %body, "Claude rejected credentials");
            GenzsmartError::ProviderNotConfigured {
                provider: PROVIDER_ID.to_string(),
            }
        }
        _ => {
            let message = match serde_json::from_str::<ApiErrorResponse>(&body) {
                Ok(api_err) => format!(
                    "Claude API error ({}): {}",
                    api_err.error.type_, api_err.error.message
                ),
                Err(_) => format!("API returned {status}: {body}"),
            };
            GenzsmartError::provider(message)
        }
    }
}

/// Returns true for HTTP status codes that indicate transient errors worth retrying.
fn is_transient_error(status: StatusCode) -> bool {
    matches!(status.as_u16(), 500 | 502 | 503 | 529)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ApiMessage;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> ClaudeClient {
        ClaudeClient::new("test-api-key", Some(base_url))
            .unwrap()
            .with_retry_delay(Duration::from_millis(10))
    }

    fn test_request() -> MessageRequest {
        MessageRequest {
            model: "claude-3-sonnet-20240229".into(),
            messages: vec![ApiMessage {
                role: "user".into(),
                content: "Hello".into(),
            }],
            system: None,
            max_tokens: 1024,
            temperature: 0.7,
            stream: false,
        }
    }

    fn success_body(text: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "msg_test",
            "type": "message",
            "role": "assistant",
            "content": [{"type": "text", "text": text}],
            "model": "claude-3-sonnet-20240229",
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 10, "output_tokens": 5}
        })
    }

    #[tokio::test]
    async fn complete_message_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body("Hi there!")))
            .mount(&server)
            .await;

        let result = test_client(&server.uri())
            .complete_message(&test_request())
            .await
            .unwrap();
        assert_eq!(result.id, "msg_test");
        assert_eq!(result.usage.input_tokens, 10);
    }

    #[tokio::test]
    async fn retries_once_on_overloaded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/messages"))
            .respond_with(ResponseTemplate::new(529).set_body_string("overloaded"))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body("After retry")))
            .mount(&server)
            .await;

        let result = test_client(&server.uri())
            .complete_message(&test_request())
            .await
            .unwrap();
        assert_eq!(result.id, "msg_test");
    }

    #[tokio::test]
    async fn rate_limit_is_not_retried_and_carries_hint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/messages"))
            .respond_with(
                ResponseTemplate::new(429)
                    .insert_header("retry-after", "12")
                    .set_body_json(serde_json::json!({
                        "error": {"type": "rate_limit_error", "message": "slow down"}
                    })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let err = test_client(&server.uri())
            .complete_message(&test_request())
            .await
            .unwrap_err();
        match err {
            GenzsmartError::RateLimit {
                provider,
                retry_after,
            } => {
                assert_eq!(provider, "claude");
                assert_eq!(retry_after, Some(Duration::from_secs(12)));
            }
            other => panic!("expected RateLimit, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unauthorized_maps_to_not_configured() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/messages"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": {"type": "authentication_error", "message": "invalid x-api-key"}
            })))
            .mount(&server)
            .await;

        let err = test_client(&server.uri())
            .complete_message(&test_request())
            .await
            .unwrap_err();
        assert!(matches!(err, GenzsmartError::ProviderNotConfigured { .. }));
    }

    #[tokio::test]
    async fn bad_request_surfaces_api_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/messages"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": {"type": "invalid_request_error", "message": "max_tokens: required"}
            })))
            .mount(&server)
            .await;

        let err = test_client(&server.uri())
            .complete_message(&test_request())
            .await
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("invalid_request_error"), "got: {msg}");
        assert!(msg.contains("max_tokens"), "got: {msg}");
    }

    #[tokio::test]
    async fn exhausted_retries_return_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/messages"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .expect(2)
            .mount(&server)
            .await;

        let err = test_client(&server.uri())
            .complete_message(&test_request())
            .await
            .unwrap_err();
        assert!(matches!(err, GenzsmartError::Provider { .. }));
    }

    #[tokio::test]
    async fn sends_auth_and_version_headers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/messages"))
            .and(header("x-api-key", "test-api-key"))
            .and(header("anthropic-version", API_VERSION))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body("ok")))
            .mount(&server)
            .await;

        let result = test_client(&server.uri())
            .complete_message(&test_request())
            .await;
        assert!(result.is_ok(), "headers should match: {result:?}");
    }
}
