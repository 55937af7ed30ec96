//! Provider-agnostic advice model: request types and the upstream transport port.

pub mod prompt;
pub mod transport;
pub mod types;
