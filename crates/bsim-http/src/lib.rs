//! HTTP surface (axum): advice streaming, Telegram webhook, health and index.

pub mod error;
pub mod handlers;
pub mod router;

pub use router::{build_router, serve, AppState};
