//! OpenAI adapter (streaming chat completions).
//!
//! The upstream already answers in the event-stream delta format the web
//! client consumes, so the body is forwarded byte for byte.

use async_trait::async_trait;
use bsim_core::{
    config::OpenAiSettings,
    errors::Error,
    model::{
        transport::{AdviceTransport, ChunkStream, Framing, UpstreamChunk},
        types::{AdvicePrompt, PromptMessage, ProviderKind},
    },
    Result,
};
use futures::StreamExt;
use serde::Serialize;

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<PromptMessage>,
    stream: bool,
}

#[derive(Clone, Debug)]
pub struct OpenAiTransport {
    settings: OpenAiSettings,
    http: reqwest::Client,
}

impl OpenAiTransport {
    pub fn new(settings: OpenAiSettings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| Error::External(format!("openai http client build error: {e}")))?;
        Ok(Self { settings, http })
    }
}

#[async_trait]
impl AdviceTransport for OpenAiTransport {
    fn provider(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    fn framing(&self) -> Framing {
        Framing::Native
    }

    async fn open(&self, prompt: &AdvicePrompt) -> Result<ChunkStream> {
        let body = CompletionRequest {
            model: &self.settings.model,
            messages: prompt.messages(),
            stream: true,
        };

        let resp = self
            .http
            .post(&self.settings.api_url)
            .bearer_auth(&self.settings.api_key)
            .json(&body)
            .send()
            .await
            .map_err(request_error)?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            tracing::warn!(
                status = status.as_u16(),
                "openai completion failed: {}",
                text.chars().take(200).collect::<String>()
            );
            return Err(Error::from_upstream_status(status.as_u16()));
        }

        tracing::debug!(model = %self.settings.model, "openai stream opened");

        Ok(resp
            .bytes_stream()
            .map(|chunk| chunk.map(UpstreamChunk::Bytes).map_err(request_error))
            .boxed())
    }
}

fn request_error(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::UpstreamTimeout
    } else {
        Error::External(format!("openai request error: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{Body, Bytes},
        http::{header, HeaderMap, StatusCode},
        response::IntoResponse,
        routing::post,
        Json, Router,
    };
    use bsim_core::domain::Language;
    use std::{
        convert::Infallible,
        sync::{Arc, Mutex},
        time::Duration,
    };
    use tokio::sync::oneshot;

    const SSE_BODY: &str = "data: {\"choices\":[{\"delta\":{\"content\":\"Save\"}}]}\n\n\
data: {\"choices\":[{\"delta\":{\"content\":\" 10%\"}}]}\n\n\
data: [DONE]\n\n";

    async fn spawn_upstream(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/v1/chat/completions")
    }

    fn transport(api_url: String, timeout: Duration) -> OpenAiTransport {
        OpenAiTransport::new(OpenAiSettings {
            api_key: "sk-test".into(),
            api_url,
            model: "gpt-4o-mini".into(),
            timeout,
        })
        .unwrap()
    }

    fn prompt() -> AdvicePrompt {
        AdvicePrompt {
            language: Language::En,
            system: "You are a helpful assistant.".into(),
            user: "How do I save more?".into(),
        }
    }

    async fn completions(headers: HeaderMap, Json(body): Json<serde_json::Value>) -> impl IntoResponse {
        let authorized = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            == Some("Bearer sk-test");
        let well_formed = body["model"] == "gpt-4o-mini"
            && body["stream"] == true
            && body["messages"][0]["role"] == "system"
            && body["messages"][1]["content"] == "How do I save more?";

        if !authorized || !well_formed {
            return (StatusCode::BAD_REQUEST, "unexpected request").into_response();
        }
        ([(header::CONTENT_TYPE, "text/event-stream")], SSE_BODY).into_response()
    }

    struct DropSignal(Option<oneshot::Sender<()>>);

    impl Drop for DropSignal {
        fn drop(&mut self) {
            if let Some(tx) = self.0.take() {
                let _ = tx.send(());
            }
        }
    }

    /// Upstream that repeats `event` forever and reports when its body is dropped.
    fn endless_upstream(event: &'static str) -> (Router, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        let signal = Arc::new(Mutex::new(Some(DropSignal(Some(tx)))));
        let app = Router::new().fallback(move || {
            let signal = signal.lock().unwrap().take();
            async move {
                let body = futures::stream::unfold(signal, move |signal| async move {
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    Some((Ok::<_, Infallible>(Bytes::from_static(event.as_bytes())), signal))
                });
                (
                    [(header::CONTENT_TYPE, "text/event-stream")],
                    Body::from_stream(body),
                )
            }
        });
        (app, rx)
    }

    async fn body_of(stream: ChunkStream) -> String {
        let chunks: Vec<Result<UpstreamChunk>> = stream.collect().await;
        chunks
            .into_iter()
            .map(|c| match c.unwrap() {
                UpstreamChunk::Bytes(b) => String::from_utf8(b.to_vec()).unwrap(),
                UpstreamChunk::Text(t) => t,
            })
            .collect()
    }

    #[tokio::test]
    async fn forwards_upstream_event_stream_verbatim() {
        let url = spawn_upstream(Router::new().route("/v1/chat/completions", post(completions))).await;
        let t = transport(url, Duration::from_secs(5));

        assert_eq!(t.framing(), Framing::Native);
        let stream = t.open(&prompt()).await.unwrap();
        assert_eq!(body_of(stream).await, SSE_BODY);
    }

    #[tokio::test]
    async fn maps_rejection_statuses() {
        let app = Router::new()
            .route(
                "/401/v1/chat/completions",
                post(|| async { (StatusCode::UNAUTHORIZED, "{\"error\":\"bad key\"}") }),
            )
            .route(
                "/429/v1/chat/completions",
                post(|| async { (StatusCode::TOO_MANY_REQUESTS, "slow down") }),
            )
            .route(
                "/503/v1/chat/completions",
                post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "down") }),
            );
        let base = spawn_upstream(app).await;
        let url_for = |code: &str| base.replace("/v1/", &format!("/{code}/v1/"));

        let err = transport(url_for("401"), Duration::from_secs(5))
            .open(&prompt())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, Error::UpstreamAuth));

        let err = transport(url_for("429"), Duration::from_secs(5))
            .open(&prompt())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, Error::UpstreamRateLimited));

        let err = transport(url_for("503"), Duration::from_secs(5))
            .open(&prompt())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, Error::Upstream { status: 503 }));
    }

    #[tokio::test]
    async fn slow_upstream_times_out() {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "late"
            }),
        );
        let url = spawn_upstream(app).await;

        let err = transport(url, Duration::from_millis(200))
            .open(&prompt())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, Error::UpstreamTimeout));
    }

    #[tokio::test]
    async fn unreachable_upstream_is_an_external_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = transport(format!("http://{addr}/v1/chat/completions"), Duration::from_secs(5))
            .open(&prompt())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, Error::External(_)));
    }

    #[tokio::test]
    async fn dropping_the_stream_closes_the_upstream_body() {
        let (app, dropped) =
            endless_upstream("data: {\"choices\":[{\"delta\":{\"content\":\"tick\"}}]}\n\n");
        let url = spawn_upstream(app).await;
        let t = transport(url, Duration::from_secs(30));

        let mut stream = t.open(&prompt()).await.unwrap();
        let first = tokio::time::timeout(Duration::from_secs(5), stream.next())
            .await
            .unwrap();
        assert!(matches!(first, Some(Ok(UpstreamChunk::Bytes(_)))));

        drop(stream);
        tokio::time::timeout(Duration::from_secs(5), dropped)
            .await
            .unwrap()
            .unwrap();
    }
}
