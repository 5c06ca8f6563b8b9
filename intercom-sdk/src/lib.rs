//! # intercom-sdk
//!
//! SDK for IP intercom / access-control devices speaking the vendor HTTP
//! API. One [`Intercom`] handle per device wires together:
//!
//! - the authenticated device client (Basic/Digest negotiation, JSON
//!   envelope, one-shot operations like switch control and snapshots),
//! - the event subscription manager (periodic pull loop with transparent
//!   re-subscription on expiry),
//! - the streaming session manager (per-session SRTP negotiation and
//!   external transcoder supervision).
//!
//! ```rust,no_run
//! use intercom_sdk::{ClientConfig, Intercom};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), intercom_sdk::IntercomError> {
//!     let intercom = Intercom::new(ClientConfig::new("192.168.1.50", "admin", "secret"))?;
//!
//!     // Retries on a fixed backoff until the device answers
//!     let info = intercom.connect().await;
//!     println!("connected to {}", info.serial_number);
//!
//!     intercom.client().unlock_door(1).await?;
//!     Ok(())
//! }
//! ```

// Main exports
pub use error::{IntercomError, Result};
pub use intercom::Intercom;

// Re-export the component types applications interact with
pub use device_client::{
    ClientConfig, ClientError, DeviceClient, FirstContact, SwitchAction, SwitchStatus, SystemInfo,
    TransportSecurity,
};
pub use event_manager::{
    classify, classify_all, ClassifierConfig, DeviceEvent, EventManagerConfig,
    EventManagerError, EventSubscriptionManager, SemanticAction, SwitchStatusPoller,
};
pub use stream_manager::{
    AudioParameters, NegotiatedSession, PrepareRequest, ProcessState, SessionStage,
    SrtpCryptoSuite, StreamError, StreamLeg, StreamSessionManager, TranscoderConfig,
    VideoParameters,
};

// Internal modules
mod error;
mod intercom;
