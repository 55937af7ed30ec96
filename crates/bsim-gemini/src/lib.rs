//! Gemini adapter (generative-content API).
//!
//! Gemini has no system role and answers in its own response shape, so this
//! transport yields plain text chunks and lets the relay frame them.

use std::collections::VecDeque;

use async_trait::async_trait;
use bsim_core::{
    config::GeminiSettings,
    errors::Error,
    model::{
        transport::{AdviceTransport, ChunkStream, Framing, UpstreamChunk},
        types::{AdvicePrompt, ProviderKind},
    },
    sse::SseLineDecoder,
    Result,
};
use bytes::Bytes;
use futures::{
    stream::{self, BoxStream},
    StreamExt,
};
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
}

impl GenerateResponse {
    fn into_text(self) -> Result<String> {
        if let Some(err) = self.error {
            return Err(Error::External(format!("gemini error: {}", err.message)));
        }
        Ok(self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default())
    }
}

#[derive(Clone, Debug)]
pub struct GeminiTransport {
    settings: GeminiSettings,
    http: reqwest::Client,
}

impl GeminiTransport {
    pub fn new(settings: GeminiSettings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| Error::External(format!("gemini http client build error: {e}")))?;
        Ok(Self { settings, http })
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/{}:{}",
            self.settings.api_base.trim_end_matches('/'),
            self.settings.model,
            method
        )
    }

    async fn post(&self, method: &str, sse: bool, body: &GenerateRequest) -> Result<reqwest::Response> {
        let url = self.method_url(method);
        tracing::debug!(url = %url, streaming = sse, "gemini request");

        let mut req = self.http.post(&url).json(body);
        if sse {
            req = req.query(&[("alt", "sse")]);
        }
        let resp = req
            .query(&[("key", self.settings.api_key.as_str())])
            .send()
            .await
            .map_err(request_error)?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            tracing::warn!(
                status = status.as_u16(),
                "gemini request failed: {}",
                text.chars().take(200).collect::<String>()
            );
            return Err(Error::from_upstream_status(status.as_u16()));
        }
        Ok(resp)
    }
}

#[async_trait]
impl AdviceTransport for GeminiTransport {
    fn provider(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    fn framing(&self) -> Framing {
        Framing::PlainText
    }

    async fn open(&self, prompt: &AdvicePrompt) -> Result<ChunkStream> {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.combined_text(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.settings.temperature,
            },
        };

        if self.settings.streaming {
            let resp = self.post("streamGenerateContent", true, &body).await?;
            return Ok(sse_text_chunks(resp.bytes_stream().boxed()));
        }

        let resp = self.post("generateContent", false, &body).await?;
        let raw = resp.bytes().await.map_err(request_error)?;
        let text = serde_json::from_slice::<GenerateResponse>(&raw)?.into_text()?;
        Ok(stream::once(async move { Ok(UpstreamChunk::Text(text)) }).boxed())
    }
}

struct SseState {
    body: BoxStream<'static, reqwest::Result<Bytes>>,
    decoder: SseLineDecoder,
    pending: VecDeque<String>,
    body_done: bool,
}

/// Decode a `streamGenerateContent?alt=sse` body into text chunks.
/// Payloads without text are skipped; the first failure ends the stream.
fn sse_text_chunks(body: BoxStream<'static, reqwest::Result<Bytes>>) -> ChunkStream {
    let state = SseState {
        body,
        decoder: SseLineDecoder::new(),
        pending: VecDeque::new(),
        body_done: false,
    };

    stream::unfold(Some(state), |state| async move {
        let mut st = state?;
        loop {
            if let Some(data) = st.pending.pop_front() {
                match payload_text(&data) {
                    Ok(Some(text)) => return Some((Ok(UpstreamChunk::Text(text)), Some(st))),
                    Ok(None) => continue,
                    Err(e) => return Some((Err(e), None)),
                }
            }
            if st.body_done {
                return None;
            }
            match st.body.next().await {
                Some(Ok(bytes)) => {
                    let payloads = st.decoder.push(&bytes);
                    st.pending.extend(payloads);
                }
                Some(Err(e)) => return Some((Err(request_error(e)), None)),
                None => {
                    st.body_done = true;
                    let tail = st.decoder.finish();
                    st.pending.extend(tail);
                }
            }
        }
    })
    .boxed()
}

fn payload_text(data: &str) -> Result<Option<String>> {
    if data.trim() == "[DONE]" {
        return Ok(None);
    }
    let text = serde_json::from_str::<GenerateResponse>(data)?.into_text()?;
    Ok((!text.is_empty()).then_some(text))
}

fn request_error(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::UpstreamTimeout
    } else {
        // reqwest includes the URL (and thus the key) in its message.
        Error::External(format!("gemini request error: {}", e.without_url()))
    }
}
