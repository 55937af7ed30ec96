//! Core domain and application logic for the budget simulator backend.
//!
//! Framework-agnostic: the upstream AI providers, Telegram and the HTTP
//! surface live behind ports (traits) implemented in adapter crates.

pub mod config;
pub mod domain;
pub mod entries;
pub mod errors;
pub mod formatting;
pub mod language;
pub mod logging;
pub mod messaging;
pub mod model;
pub mod relay;
pub mod replies;
pub mod sse;

pub use errors::{Error, Result};
