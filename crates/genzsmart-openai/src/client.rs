// SPDX-FileCopyrightText: 2026 GenzSmart Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for Chat Completions endpoints.
//!
//! One [`ChatClient`] serves any vendor speaking the OpenAI wire format;
//! the vendor only changes the base URL, timeout, and a few extra headers.

use std::pin::Pin;
use std::time::Duration;

use futures::Stream;
use genzsmart_core::GenzsmartError;
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, RETRY_AFTER};
use tracing::{debug, warn};

use crate::sse;
use crate::types::{ApiErrorResponse, ChatChunk, ChatRequest, ChatResponse};

/// Connection settings for a [`ChatClient`].
#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// Provider identifier used in errors and logs.
    pub provider: String,
    pub api_key: String,
    /// API root; `/chat/completions` and `/models` are appended.
    pub base_url: String,
    pub timeout: Duration,
    /// Vendor-specific headers sent with every request.
    pub extra_headers: Vec<(&'static str, String)>,
}

/// HTTP client for OpenAI-compatible APIs.
///
/// Retries once on transient upstream failures (500, 502, 503, 529).
#[derive(Debug, Clone)]
pub struct ChatClient {
    client: reqwest::Client,
    provider: String,
    base_url: String,
    max_retries: u32,
    retry_delay: Duration,
}

impl ChatClient {
    pub fn new(settings: ClientSettings) -> Result<Self, GenzsmartError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", settings.api_key)).map_err(|e| {
                GenzsmartError::Config(format!("invalid API key header value: {e}"))
            })?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        for (name, value) in &settings.extra_headers {
            let value = HeaderValue::from_str(value).map_err(|e| {
                GenzsmartError::Config(format!("invalid value for header {name}: {e}"))
            })?;
            headers.insert(HeaderName::from_static(name), value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(settings.timeout)
            .build()
            .map_err(|e| GenzsmartError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            provider: settings.provider,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            max_retries: 1,
            retry_delay: Duration::from_secs(1),
        })
    }

    /// Shortens the retry delay (for tests against wiremock).
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// Sends a non-streaming completion request.
    pub async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, GenzsmartError> {
        let mut req = request.clone();
        req.stream = false;

        let response = self.send(&req).await?;
        let body = response.text().await.map_err(|e| GenzsmartError::Provider {
            message: format!("failed to read response body: {e}"),
            source: Some(Box::new(e)),
        })?;
        serde_json::from_str(&body).map_err(|e| GenzsmartError::Provider {
            message: format!("failed to parse {} response: {e}", self.provider),
            source: Some(Box::new(e)),
        })
    }

    /// Sends a streaming completion request and returns the parsed chunks.
    pub async fn stream(
        &self,
        request: &ChatRequest,
    ) -> Result<Pin<Box<dyn Stream<Item = Result<ChatChunk, GenzsmartError>> + Send>>, GenzsmartError>
    {
        let mut req = request.clone();
        req.stream = true;

        let response = self.send(&req).await?;
        Ok(sse::parse_sse_stream(response))
    }

    /// Lists `{base}/models`; succeeds when the credential is accepted.
    pub async fn list_models(&self) -> Result<(), GenzsmartError> {
        let response = self
            .client
            .get(format!("{}/models", self.base_url))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(self.error_from_response(response).await)
        }
    }

    /// Sends a completion request once, without retry, and reports only the status.
    pub async fn probe(&self, request: &ChatRequest) -> Result<StatusCode, GenzsmartError> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        Ok(response.status())
    }

    async fn send(&self, request: &ChatRequest) -> Result<reqwest::Response, GenzsmartError> {
        let url = format!("{}/chat/completions", self.base_url);

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(provider = %self.provider, attempt, "retrying request after transient error");
                tokio::time::sleep(self.retry_delay).await;
            }

            let response = self
                .client
                .post(&url)
                .json(request)
                .send()
                .await
                .map_err(|e| self.transport_error(e))?;

            let status = response.status();
            debug!(provider = %self.provider, status = %status, attempt, stream = request.stream, "response received");

            if status.is_success() {
                return Ok(response);
            }

            if is_transient_error(status) && attempt < self.max_retries {
                let body = response.text().await.unwrap_or_default();
                warn!(provider = %self.provider, status = %status, body = %body, "transient error, will retry");
                continue;
            }

            return Err(self.error_from_response(response).await);
        }

        Err(GenzsmartError::provider(format!(
            "{} request failed after retries",
            self.provider
        )))
    }

    fn transport_error(&self, e: reqwest::Error) -> GenzsmartError {
        GenzsmartError::Provider {
            message: format!("{} request failed: {e}", self.provider),
            source: Some(Box::new(e)),
        }
    }

    async fn error_from_response(&self, response: reqwest::Response) -> GenzsmartError {
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
                provider: self.provider.clone(),
                retry_after,
            },
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                warn!(provider = %self.provider, status = %status, body = %body, "credentials rejected");
                GenzsmartError::ProviderNotConfigured {
                    provider: self.provider.clone(),
                }
            }
            _ => {
                let detail = serde_json::from_str::<ApiErrorResponse>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                GenzsmartError::provider(format!("HTTP {}: {detail}", status.as_u16()))
            }
        }
    }
}

fn is_transient_error(status: StatusCode) -> bool {
    matches!(status.as_u16(), 500 | 502 | 503 | 529)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChatMessage;
    use futures::StreamExt;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> ChatClient {
        ChatClient::new(ClientSettings {
            provider: "openai".into(),
            api_key: "sk-test".into(),
            base_url: base_url.into(),
            timeout: Duration::from_secs(5),
            extra_headers: vec![("x-title", "GenzSmart".into())],
        })
        .unwrap()
        .with_retry_delay(Duration::from_millis(10))
    }

    fn test_request() -> ChatRequest {
        ChatRequest {
            model: "gpt-4".into(),
            messages: vec![ChatMessage {
                role: "user".into(),
                content: "Hello".into(),
            }],
            temperature: 0.7,
            max_tokens: None,
            stream: false,
        }
    }

    fn success_body() -> serde_json::Value {
        serde_json::json!({
            "model": "gpt-4-0613",
            "choices": [{"message": {"role": "assistant", "content": "Hi!"}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 5, "completion_tokens": 2, "total_tokens": 7}
        })
    }

    #[tokio::test]
    async fn sends_bearer_and_extra_headers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(header("x-title", "GenzSmart"))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body()))
            .mount(&server)
            .await;

        let resp = test_client(&server.uri())
            .complete(&test_request())
            .await
            .unwrap();
        assert_eq!(resp.model.as_deref(), Some("gpt-4-0613"));
    }

    #[tokio::test]
    async fn retries_once_on_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(502))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body()))
            .mount(&server)
            .await;

        assert!(test_client(&server.uri()).complete(&test_request()).await.is_ok());
    }

    #[tokio::test]
    async fn rate_limit_maps_to_rate_limit_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "3"))
            .expect(1)
            .mount(&server)
            .await;

        let err = test_client(&server.uri())
            .complete(&test_request())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GenzsmartError::RateLimit { ref provider, retry_after: Some(d) }
                if provider == "openai" && d == Duration::from_secs(3)
        ));
    }

    #[tokio::test]
    async fn vendor_error_message_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "error": {"message": "The model `gpt-5` does not exist", "type": "invalid_request_error"}
            })))
            .mount(&server)
            .await;

        let err = test_client(&server.uri())
            .complete(&test_request())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("HTTP 404: The model `gpt-5` does not exist"));
    }

    #[tokio::test]
    async fn list_models_rejects_bad_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/models"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = test_client(&server.uri()).list_models().await.unwrap_err();
        assert!(matches!(err, GenzsmartError::ProviderNotConfigured { .. }));
    }

    #[tokio::test]
    async fn stream_forces_stream_flag() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(wiremock::matchers::body_partial_json(serde_json::json!({"stream": true})))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string("data: {\"choices\":[{\"delta\":{\"content\":\"x\"}}]}\n\ndata: [DONE]\n\n"),
            )
            .mount(&server)
            .await;

        let chunks: Vec<_> = test_client(&server.uri())
            .stream(&test_request())
            .await
            .unwrap()
            .collect()
            .await;
        assert_eq!(chunks.len(), 1);
    }
}
