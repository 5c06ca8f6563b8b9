//! Error types for the event manager

use device_client::ClientError;
use thiserror::Error;

/// Errors that can occur while managing the device event subscription
#[derive(Debug, Error)]
pub enum EventManagerError {
    /// A pull was attempted without an active subscription
    ///
    /// Pulling before `subscribe()` succeeds is a caller error; the polling
    /// loop never hits this because it resubscribes before each pull.
    #[error("not subscribed to device events")]
    NotSubscribed,

    /// The device accepted the subscribe call but returned no usable id
    #[error("device did not return a subscription id")]
    MissingSubscriptionId,

    /// Invalid manager configuration
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Failure in the underlying device client
    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Convenience type alias for Results using EventManagerError
pub type Result<T> = std::result::Result<T, EventManagerError>;
