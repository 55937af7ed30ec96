use axum::{extract::State, Json};
use serde_json::{json, Value};
use teloxide::types::Update;

use crate::router::AppState;

/// `POST /telegram/webhook`. Always acknowledges so Telegram does not
/// redeliver; reply failures are logged.
pub async fn telegram_webhook(State(state): State<AppState>, Json(update): Json<Update>) -> Json<Value> {
    if let Some(messenger) = state.messenger.as_deref() {
        if let Err(e) =
            bsim_telegram::handlers::handle_update(&update, messenger, &state.cfg.mini_app_url).await
        {
            tracing::error!(update_id = ?update.id, "telegram reply failed: {e}");
        }
    }
    Json(json!({ "ok": true }))
}
