//! Unified error type for the SDK facade

use thiserror::Error;

/// Any error surfaced by the SDK
///
/// Thin wrapper over the per-crate error types so applications can hold one
/// error in their signatures.
#[derive(Debug, Error)]
pub enum IntercomError {
    /// Device client failure
    #[error(transparent)]
    Client(#[from] device_client::ClientError),

    /// Event subscription failure
    #[error(transparent)]
    Events(#[from] event_manager::EventManagerError),

    /// Streaming session failure
    #[error(transparent)]
    Stream(#[from] stream_manager::StreamError),
}

/// Convenience type alias for Results using IntercomError
pub type Result<T> = std::result::Result<T, IntercomError>;
