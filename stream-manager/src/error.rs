//! Error types for the stream manager

use thiserror::Error;

/// Errors that can occur while managing streaming sessions
#[derive(Debug, Error)]
pub enum StreamError {
    /// `start` was called without a matching prepared session
    #[error("no session info for '{0}'")]
    NoSessionInfo(String),

    /// A session with this id is already streaming
    #[error("session '{0}' is already active")]
    SessionActive(String),

    /// Snapshot fetch failed in the device client
    #[error(transparent)]
    Client(#[from] device_client::ClientError),
}

/// Convenience type alias for Results using StreamError
pub type Result<T> = std::result::Result<T, StreamError>;
