/// Core error type.
///
/// Adapter crates map their specific errors into this type so the dispatcher
/// can turn every failure into a fixed user-facing reply.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid mac address: {0}")]
    InvalidMac(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("external error: {0}")]
    External(String),
}

pub type Result<T> = std::result::Result<T, Error>;
