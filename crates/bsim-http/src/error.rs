//! Mapping of core errors onto HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bsim_core::errors::Error;
use serde_json::json;

/// Handler error: wraps the core error and renders `{"error": "..."}`.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            Error::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::UpstreamAuth => StatusCode::UNAUTHORIZED,
            Error::UpstreamRateLimited => StatusCode::TOO_MANY_REQUESTS,
            Error::UpstreamTimeout => StatusCode::GATEWAY_TIMEOUT,
            Error::Upstream { status } => StatusCode::from_u16(*status)
                .ok()
                .filter(|s| s.is_client_error() || s.is_server_error())
                .unwrap_or(StatusCode::BAD_GATEWAY),
            Error::Io(_) | Error::Json(_) | Error::External(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Client-facing message. Transport internals are not echoed back.
    pub fn message(&self) -> String {
        match &self.0 {
            Error::Config(msg) => msg.clone(),
            Error::UpstreamAuth => "Invalid API key".to_string(),
            Error::UpstreamRateLimited => "Rate limit exceeded. Please try again later.".to_string(),
            Error::UpstreamTimeout => "Request timeout".to_string(),
            Error::Upstream { status } => format!("AI service error: {status}"),
            Error::Io(_) | Error::Json(_) | Error::External(_) => {
                "Internal server error".to_string()
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "request failed: {}", self.0);
        } else {
            tracing::warn!(status = status.as_u16(), "request rejected: {}", self.0);
        }
        (status, Json(json!({ "error": self.message() }))).into_response()
    }
}
