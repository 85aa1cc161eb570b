// SPDX-FileCopyrightText: 2026 GenzSmart Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stream normalization shared by every provider adapter.

use std::pin::Pin;

use futures::stream::{Stream, StreamExt};

use crate::error::GenzsmartError;
use crate::traits::ChunkStream;
use crate::types::StreamChunk;

/// Finish reason synthesized when a vendor stream ends without one.
pub const DEFAULT_FINISH_REASON: &str = "stop";

type RawStream = Pin<Box<dyn Stream<Item = Result<StreamChunk, GenzsmartError>> + Send>>;

/// Wraps a vendor chunk stream so that it obeys the terminal-chunk contract.
///
/// - empty non-terminal chunks are dropped
/// - the first terminal chunk is forwarded and ends the stream
/// - if the vendor stream ends without a terminal chunk one is synthesized
/// - an error is forwarded and ends the stream without a terminal chunk
///
/// The vendor stream is dropped as soon as the output ends, which closes the
/// underlying connection.
pub fn normalize_stream<S>(inner: S) -> ChunkStream
where
    S: Stream<Item = Result<StreamChunk, GenzsmartError>> + Send + 'static,
{
    let inner: Option<RawStream> = Some(Box::pin(inner));

    Box::pin(futures::stream::unfold(inner, |mut slot| async move {
        let stream = slot.as_mut()?;
        loop {
            match stream.next().await {
                Some(Ok(chunk)) if chunk.is_finished => return Some((Ok(chunk), None)),
                Some(Ok(chunk)) if chunk.content.is_empty() => continue,
                Some(Ok(chunk)) => return Some((Ok(chunk), slot)),
                Some(Err(e)) => return Some((Err(e), None)),
                None => {
                    return Some((
                        Ok(StreamChunk::terminal(DEFAULT_FINISH_REASON, None)),
                        None,
                    ));
                }
            }
        }
    }))
}
