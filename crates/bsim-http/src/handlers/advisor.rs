use axum::{
    body::Body,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use bsim_core::{
    config::AI_NOT_CONFIGURED, errors::Error, model::types::ChatRequest, relay::StreamEvent,
};
use futures::StreamExt;

use crate::{error::ApiError, router::AppState};

/// `POST /api/financial-advisor`: relay the chat message upstream and stream
/// the answer back as server-sent events.
pub async fn financial_advisor(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Response, ApiError> {
    let relay = state
        .relay
        .as_ref()
        .ok_or_else(|| Error::Config(AI_NOT_CONFIGURED.to_string()))?;

    let events = relay.stream_advice(&req).await?;
    let body = Body::from_stream(events.map(|event| event.map(StreamEvent::into_bytes)));

    Ok((
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
            (header::CONNECTION, "keep-alive"),
        ],
        body,
    )
        .into_response())
}
