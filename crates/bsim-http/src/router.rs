//! Router construction and the server loop.

use std::sync::Arc;

use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use bsim_core::{config::Config, messaging::port::MessagingPort, relay::AdviceRelay, Result};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers;

pub const ADVISOR_PATH: &str = "/api/financial-advisor";
pub const WEBHOOK_PATH: &str = "/telegram/webhook";

/// Shared handler state. Absent parts disable the matching feature.
#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    /// `None` when no upstream credentials are configured.
    pub relay: Option<Arc<AdviceRelay>>,
    /// `None` when no bot token is configured; the webhook route is then not mounted.
    pub messenger: Option<Arc<dyn MessagingPort>>,
}

pub fn build_router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/", get(handlers::health::index))
        .route("/health", get(handlers::health::health))
        .route(ADVISOR_PATH, post(handlers::advisor::financial_advisor));

    if state.messenger.is_some() {
        router = router.route(WEBHOOK_PATH, post(handlers::webhook::telegram_webhook));
    }

    router
        .layer(cors_layer(state.cfg.frontend_url.as_deref()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(frontend_url: Option<&str>) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    let Some(url) = frontend_url else {
        return cors.allow_origin(Any);
    };

    match HeaderValue::from_str(url.trim().trim_end_matches('/')) {
        Ok(origin) => cors.allow_origin(origin),
        Err(e) => {
            tracing::warn!(url, "FRONTEND_URL is not a valid origin ({e}); allowing any origin");
            cors.allow_origin(Any)
        }
    }
}

/// Bind `cfg.bind_addr` and serve until the process is stopped.
pub async fn serve(state: AppState) -> Result<()> {
    let addr = state.cfg.bind_addr;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        ai_configured = state.relay.is_some(),
        webhook = state.messenger.is_some(),
        "http server listening"
    );
    axum::serve(listener, build_router(state)).await?;
    Ok(())
}
