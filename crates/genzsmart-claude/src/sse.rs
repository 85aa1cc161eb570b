// SPDX-FileCopyrightText: 2026 GenzSmart Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SSE stream parser for Claude streaming responses.
//!
//! Converts a reqwest response byte stream into typed [`StreamEvent`] variants
//! using the `eventsource-stream` crate for SSE protocol compliance.

use std::pin::Pin;

use eventsource_stream::Eventsource;
use futures::stream::{Stream, StreamExt};
use genzsmart_core::GenzsmartError;
use serde::de::DeserializeOwned;

use crate::types::{SseContentBlockDelta, SseError, SseMessageDelta, SseMessageStart};

/// Typed SSE events from the Claude streaming protocol.
///
/// Block start/stop events carry nothing the adapter needs and are dropped
/// along with any event name this parser does not know.
#[derive(Debug, Clone)]
pub enum StreamEvent {
    /// Initial message metadata (model, prompt usage).
    MessageStart(SseMessageStart),
    /// Incremental update to a content block.
    ContentBlockDelta(SseContentBlockDelta),
    /// Message-level delta (stop_reason, output usage).
    MessageDelta(SseMessageDelta),
    /// The message is complete.
    MessageStop,
    /// Keep-alive ping.
    Ping,
    /// API error during streaming.
    Error(SseError),
}

fn parse_event<T: DeserializeOwned>(name: &str, data: &str) -> Result<T, GenzsmartError> {
    serde_json::from_str::<T>(data).map_err(|e| GenzsmartError::Provider {
        message: format!("failed to parse {name}: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parses a reqwest streaming response into a stream of typed [`StreamEvent`]s.
pub fn parse_sse_stream(
    response: reqwest::Response,
) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, GenzsmartError>> + Send>> {
    let event_stream = response.bytes_stream().eventsource();

    let mapped = event_stream.filter_map(|result| async move {
        match result {
            Ok(event) => {
                let name = event.event.as_str();
                let parsed = match name {
                    "message_start" => {
                        parse_event(name, &event.data).map(StreamEvent::MessageStart)
                    }
                    "content_block_delta" => {
                        parse_event(name, &event.data).map(StreamEvent::ContentBlockDelta)
                    }
                    "message_delta" => {
                        parse_event(name, &event.data).map(StreamEvent::MessageDelta)
                    }
                    "message_stop" => Ok(StreamEvent::MessageStop),
                    "ping" => Ok(StreamEvent::Ping),
                    "error" => parse_event(name, &event.data).map(StreamEvent::Error),
                    _ => return None,
                };
                Some(parsed)
            }
            Err(e) => Some(Err(GenzsmartError::provider(format!(
                "SSE stream error: {e}"
            )))),
        }
    });

    Box::pin(mapped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SseDelta;

    async fn mock_sse_response(sse_text: &str) -> reqwest::Response {
        use wiremock::matchers::method;
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(sse_text.to_string()),
            )
            .mount(&server)
            .await;

        reqwest::get(&server.uri()).await.unwrap()
    }

    #[tokio::test]
    async fn parse_text_delta() {
        let sse = "event: content_block_delta\ndata: {\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"Hello\"}}\n\n";
        let mut stream = parse_sse_stream(mock_sse_response(sse).await);

        match stream.next().await.unwrap().unwrap() {
            StreamEvent::ContentBlockDelta(delta) => match delta.delta {
                SseDelta::TextDelta { text } => assert_eq!(text, "Hello"),
                other => panic!("expected TextDelta, got {other:?}"),
            },
            other => panic!("expected ContentBlockDelta, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn parse_full_sequence_skipping_block_boundaries() {
        let sse = concat!(
            "event: message_start\n",
            "data: {\"type\":\"message_start\",\"message\":{\"id\":\"msg_1\",\"model\":\"claude-3-haiku-20240307\",\"usage\":{\"input_tokens\":12,\"output_tokens\":1}}}\n\n",
            "event: content_block_start\n",
            "data: {\"type\":\"content_block_start\",\"index\":0,\"content_block\":{\"type\":\"text\",\"text\":\"\"}}\n\n",
            "event: ping\n",
            "data: {\"type\":\"ping\"}\n\n",
            "event: content_block_delta\n",
            "data: {\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"Hi\"}}\n\n",
            "event: content_block_stop\n",
            "data: {\"type\":\"content_block_stop\",\"index\":0}\n\n",
            "event: message_delta\n",
            "data: {\"delta\":{\"stop_reason\":\"end_turn\"},\"usage\":{\"output_tokens\":4}}\n\n",
            "event: message_stop\n",
            "data: {\"type\":\"message_stop\"}\n\n",
        );
        let stream = parse_sse_stream(mock_sse_response(sse).await);
        let events: Vec<_> = stream.collect().await;

        assert_eq!(events.len(), 5);
        match events[0].as_ref().unwrap() {
            StreamEvent::MessageStart(start) => {
                assert_eq!(start.message.usage.input_tokens, 12);
            }
            other => panic!("expected MessageStart, got {other:?}"),
        }
        assert!(matches!(events[1], Ok(StreamEvent::Ping)));
        assert!(matches!(events[2], Ok(StreamEvent::ContentBlockDelta(_))));
        match events[3].as_ref().unwrap() {
            StreamEvent::MessageDelta(delta) => {
                assert_eq!(delta.delta.stop_reason.as_deref(), Some("end_turn"));
                assert_eq!(delta.usage.unwrap().output_tokens, 4);
            }
            other => panic!("expected MessageDelta, got {other:?}"),
        }
        assert!(matches!(events[4], Ok(StreamEvent::MessageStop)));
    }

    #[tokio::test]
    async fn parse_error_event() {
        let sse = "event: error\ndata: {\"type\":\"error\",\"error\":{\"type\":\"overloaded_error\",\"message\":\"Overloaded\"}}\n\n";
        let mut stream = parse_sse_stream(mock_sse_response(sse).await);

        match stream.next().await.unwrap().unwrap() {
            StreamEvent::Error(err) => {
                assert_eq!(err.error.type_, "overloaded_error");
                assert_eq!(err.error.message, "Overloaded");
            }
            other => panic!("expected Error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_payload_is_an_error() {
        let sse = "event: message_delta\ndata: {not json}\n\n";
        let mut stream = parse_sse_stream(mock_sse_response(sse).await);
        let err = stream.next().await.unwrap().unwrap_err();
        assert!(err.to_string().contains("message_delta"));
    }

    #[tokio::test]
    async fn unknown_events_are_skipped() {
        let sse = "event: future_event\ndata: {}\n\nevent: message_stop\ndata: {}\n\n";
        let stream = parse_sse_stream(mock_sse_response(sse).await);
        let events: Vec<_> = stream.collect().await;
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], Ok(StreamEvent::MessageStop)));
    }
}
