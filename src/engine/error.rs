//! Engine client error types

use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine refused the request (per-call failure, e.g. a preview
    /// template it cannot resolve for the given fixture).
    #[error("engine rejected request: {0}")]
    Rejected(String),

    /// The engine process exited or its pipe closed.
    #[error("engine connection closed")]
    Closed,

    /// A reply arrived but its payload did not match the expected shape.
    #[error("malformed engine reply: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("failed to spawn engine process: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("engine i/o error: {0}")]
    Io(#[from] std::io::Error),
}
