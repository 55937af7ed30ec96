//! Outbound messenger abstraction used by the bot webhook.

pub mod port;
pub mod types;
