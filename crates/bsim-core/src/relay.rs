//! Advice relay: turns a chat request into the client-facing event stream.
//!
//! The relay is written once against [`AdviceTransport`]; the transport's
//! [`Framing`] decides how chunks are shaped and how failures surface:
//!
//! - `Native`: upstream bytes are forwarded untouched. An upstream rejection
//!   is returned as an error before any event is produced, so the caller can
//!   still answer with a plain error status.
//! - `PlainText`: every text chunk becomes a delta event and the stream always
//!   ends with the done marker. Failures, including a failed connect, are
//!   reported in-band as a final `"\n\nError: ..."` delta.

use std::sync::Arc;

use bytes::Bytes;
use futures::{
    future,
    stream::{self, BoxStream},
    StreamExt,
};
use serde_json::json;

use crate::{
    model::{
        prompt::build_prompt,
        transport::{AdviceTransport, ChunkStream, Framing, UpstreamChunk},
        types::ChatRequest,
    },
    Error, Result,
};

/// One event of the outbound stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StreamEvent {
    /// Assistant text increment.
    Delta(String),
    /// Terminal marker.
    Done,
    /// Pre-framed bytes forwarded verbatim.
    Raw(Bytes),
}

impl StreamEvent {
    /// Wire encoding: `data: <json>\n\n` lines in the chat-completions delta shape.
    pub fn into_bytes(self) -> Bytes {
        match self {
            StreamEvent::Delta(text) => {
                let payload = json!({ "choices": [{ "delta": { "content": text } }] });
                Bytes::from(format!("data: {payload}\n\n"))
            }
            StreamEvent::Done => Bytes::from_static(b"data: [DONE]\n\n"),
            StreamEvent::Raw(bytes) => bytes,
        }
    }
}

pub type EventStream = BoxStream<'static, Result<StreamEvent>>;

pub struct AdviceRelay {
    transport: Arc<dyn AdviceTransport>,
}

impl AdviceRelay {
    pub fn new(transport: Arc<dyn AdviceTransport>) -> Self {
        Self { transport }
    }

    /// Build the prompt for `req`, open the upstream and return the event stream.
    ///
    /// Nothing is spawned: dropping the returned stream drops the upstream
    /// connection with it.
    pub async fn stream_advice(&self, req: &ChatRequest) -> Result<EventStream> {
        let prompt = build_prompt(req);
        let provider = self.transport.provider().as_str();
        tracing::info!(
            provider,
            language = prompt.language.code(),
            with_state = req.user_state.is_some(),
            "advice request"
        );

        match self.transport.framing() {
            Framing::Native => {
                let chunks = self.transport.open(&prompt).await.map_err(|e| {
                    tracing::warn!(provider, "upstream rejected advice request: {e}");
                    e
                })?;
                Ok(chunks
                    .map(|chunk| chunk.map(event_for_chunk))
                    .boxed())
            }
            Framing::PlainText => {
                let body = match self.transport.open(&prompt).await {
                    Ok(chunks) => in_band_errors(chunks),
                    Err(e) => {
                        tracing::warn!(provider, "upstream connect failed: {e}");
                        stream::once(future::ready(Ok(error_delta(&e)))).boxed()
                    }
                };
                Ok(body
                    .chain(stream::once(future::ready(Ok(StreamEvent::Done))))
                    .boxed())
            }
        }
    }
}

fn event_for_chunk(chunk: UpstreamChunk) -> StreamEvent {
    match chunk {
        UpstreamChunk::Bytes(bytes) => StreamEvent::Raw(bytes),
        UpstreamChunk::Text(text) => StreamEvent::Delta(text),
    }
}

fn error_delta(err: &Error) -> StreamEvent {
    StreamEvent::Delta(format!("\n\nError: {err}"))
}

/// Map text chunks to deltas, skipping empty ones. The first failure becomes
/// an error delta and ends the sequence.
fn in_band_errors(chunks: ChunkStream) -> EventStream {
    stream::unfold(Some(chunks), |state| async move {
        let mut chunks = state?;
        loop {
            match chunks.next().await {
                Some(Ok(UpstreamChunk::Text(text))) if text.is_empty() => continue,
                Some(Ok(chunk)) => return Some((Ok(event_for_chunk(chunk)), Some(chunks))),
                Some(Err(e)) => {
                    tracing::warn!("upstream stream failed: {e}");
                    return Some((Ok(error_delta(&e)), None));
                }
                None => return None,
            }
        }
    })
    .boxed()
}
