/// Core error type shared by every crate in the workspace.
///
/// Adapter crates map their specific errors into this type so the HTTP layer
/// can turn failures into a consistent status code and message.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("upstream rejected credentials (401)")]
    UpstreamAuth,

    #[error("upstream rate limit exceeded (429)")]
    UpstreamRateLimited,

    #[error("upstream request timed out")]
    UpstreamTimeout,

    #[error("upstream error: status {status}")]
    Upstream { status: u16 },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("external error: {0}")]
    External(String),
}

impl Error {
    /// Map a non-success upstream HTTP status onto the error taxonomy.
    pub fn from_upstream_status(status: u16) -> Self {
        match status {
            401 => Error::UpstreamAuth,
            429 => Error::UpstreamRateLimited,
            status => Error::Upstream { status },
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
