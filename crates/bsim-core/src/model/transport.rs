use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;

use crate::Result;

use super::types::{AdvicePrompt, ProviderKind};

/// How a transport's chunks relate to the client-facing event-stream format.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Framing {
    /// Upstream already speaks the client wire format; chunks are forwarded
    /// byte for byte and failures are raised to the caller.
    Native,
    /// Upstream yields plain text; the relay wraps each chunk into an event,
    /// appends the done marker and reports failures in-band.
    PlainText,
}

/// One raw piece of upstream output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UpstreamChunk {
    /// Pre-framed event-stream bytes.
    Bytes(Bytes),
    /// An assistant text increment.
    Text(String),
}

/// Lazy, finite, non-restartable chunk sequence bound to one upstream
/// connection. Dropping it closes the connection.
pub type ChunkStream = BoxStream<'static, Result<UpstreamChunk>>;

/// Upstream transport port. One implementation per provider family; the relay
/// is written once against this trait.
#[async_trait]
pub trait AdviceTransport: Send + Sync {
    fn provider(&self) -> ProviderKind;
    fn framing(&self) -> Framing;

    /// Establish the upstream exchange for `prompt`.
    ///
    /// Returns once the upstream has answered (status line received); chunks
    /// are pulled from the returned stream as they arrive.
    async fn open(&self, prompt: &AdvicePrompt) -> Result<ChunkStream>;
}

