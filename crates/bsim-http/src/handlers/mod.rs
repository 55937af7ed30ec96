//! Route handlers.

pub mod advisor;
pub mod health;
pub mod webhook;
