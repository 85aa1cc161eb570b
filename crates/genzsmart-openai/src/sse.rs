// SPDX-FileCopyrightText: 2026 GenzSmart Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SSE parser for Chat Completions streams.
//!
//! Every event is an unnamed `data:` line holding a [`ChatChunk`]; the
//! literal `[DONE]` marks the end of the stream.

use std::pin::Pin;

use eventsource_stream::Eventsource;
use futures::stream::{Stream, StreamExt};
use genzsmart_core::GenzsmartError;
use tracing::debug;

use crate::types::ChatChunk;

/// Sentinel payload that terminates a Chat Completions stream.
pub const DONE_MARKER: &str = "[DONE]";

/// Parses a streaming response into typed [`ChatChunk`]s.
///
/// The stream ends at `[DONE]` even if the server keeps the connection open.
/// Payloads that are not valid chunk JSON are skipped.
pub fn parse_sse_stream(
    response: reqwest::Response,
) -> Pin<Box<dyn Stream<Item = Result<ChatChunk, GenzsmartError>> + Send>> {
    let events = response
        .bytes_stream()
        .eventsource()
        .take_while(|result| {
            let done = matches!(result, Ok(event) if event.data.trim() == DONE_MARKER);
            futures::future::ready(!done)
        })
        .filter_map(|result| async move {
            match result {
                Ok(event) => match serde_json::from_str::<ChatChunk>(&event.data) {
                    Ok(chunk) => Some(Ok(chunk)),
                    Err(e) => {
                        debug!(error = %e, data = %event.data, "skipping unparsable stream payload");
                        None
                    }
                },
                Err(e) => Some(Err(GenzsmartError::provider(format!(
                    "SSE stream error: {e}"
                )))),
            }
        });

    Box::pin(events)
}
