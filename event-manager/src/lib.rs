//! # event-manager
//!
//! Event subscription orchestration for the intercom device.
//!
//! The device buffers events server-side behind a subscription with a
//! limited expiry window; clients pull buffered events with a long-poll
//! call. This crate owns that lifecycle: it subscribes, pulls on a fixed
//! period, resubscribes transparently when the subscription silently
//! expires, and hands raw events to the consumer over a channel. A pure
//! classification layer maps raw events onto a closed set of semantic
//! actions.

mod classify;
mod error;
mod event;
mod manager;
mod status_poller;

pub use classify::{classify, classify_all, ClassifierConfig, SemanticAction};
pub use error::{EventManagerError, Result};
pub use event::DeviceEvent;
pub use manager::{EventManagerConfig, EventSubscriptionManager, DEFAULT_CATEGORIES};
pub use status_poller::SwitchStatusPoller;
