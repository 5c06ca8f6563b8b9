//! Private HTTP client for intercom device communication
//!
//! This crate provides a minimal client specifically designed for the
//! intercom's REST API: plain GET endpoints with query-string parameters,
//! Basic or Digest authentication negotiated per request, and a uniform
//! JSON response envelope. Event polling and media streaming are layered
//! on top of this client by their own crates.

mod auth;
mod client;
mod config;
mod error;
mod types;

pub use auth::{basic_authorization, digest_response, AuthChallenge};
pub use client::{paths, DeviceClient};
pub use config::{ClientConfig, FirstContact, TransportSecurity};
pub use error::{ClientError, Result};
pub use types::{
    Envelope, ErrorBody, SwitchAction, SwitchStatus, SystemInfo, ERROR_SUBSCRIPTION_NOT_FOUND,
};
