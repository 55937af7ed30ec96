use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::router::{AppState, ADVISOR_PATH, WEBHOOK_PATH};

const SERVICE_NAME: &str = "Budget Simulator API";
const API_VERSION: &str = "1.0.0";

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "ai_configured": state.relay.is_some(),
    }))
}

pub async fn index(State(state): State<AppState>) -> Json<Value> {
    let mut endpoints = json!({
        "health": "/health",
        "financial_advisor": ADVISOR_PATH,
    });
    if state.messenger.is_some() {
        endpoints["telegram_webhook"] = json!(WEBHOOK_PATH);
    }

    Json(json!({
        "message": SERVICE_NAME,
        "version": API_VERSION,
        "endpoints": endpoints,
    }))
}
