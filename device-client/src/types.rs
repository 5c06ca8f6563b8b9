//! Response envelope and data types for the device REST API
//!
//! Every endpoint wraps its payload in the same JSON envelope:
//! `{"success": bool, "result": {...}}` on success and
//! `{"success": false, "error": {"code": int, "message": "..."}}` on failure.

use serde::Deserialize;

use crate::error::{ClientError, Result};

/// Device error code for "subscription not found / expired"
///
/// Returned by the log pull endpoint once the server-side subscription
/// window has lapsed; the event manager recovers from it transparently.
pub const ERROR_SUBSCRIPTION_NOT_FOUND: i64 = 12;

/// The JSON envelope every API response is wrapped in
///
/// A `success: false` envelope is not itself an error at this layer; callers
/// interpret the error body per endpoint (the pull endpoint, for instance,
/// treats code 12 as a recoverable expiry).
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    /// Whether the device accepted the operation
    pub success: bool,
    /// Endpoint-specific payload, present on success
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    /// Error body, present on failure
    #[serde(default)]
    pub error: Option<ErrorBody>,
}

/// Error body of an unsuccessful envelope
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    /// Device-defined error code
    pub code: i64,
    /// Human-readable description
    #[serde(default)]
    pub message: String,
}

impl Envelope {
    /// Device error carried by this envelope, if any
    pub fn device_error(&self) -> Option<&ErrorBody> {
        if self.success {
            None
        } else {
            self.error.as_ref()
        }
    }

    /// Succeed with `()` or surface the device error
    pub fn ok(self) -> Result<()> {
        self.into_checked().map(|_| ())
    }

    /// Extract the result payload, surfacing device errors and missing bodies
    pub fn result(self) -> Result<serde_json::Value> {
        self.into_checked()?
            .ok_or_else(|| ClientError::Parse("envelope missing result".to_string()))
    }

    fn into_checked(self) -> Result<Option<serde_json::Value>> {
        if self.success {
            return Ok(self.result);
        }
        match self.error {
            Some(error) => Err(ClientError::Device {
                code: error.code,
                message: error.message,
            }),
            None => Err(ClientError::Parse(
                "unsuccessful envelope without error body".to_string(),
            )),
        }
    }
}

/// Device identity and firmware details from `/api/system/info`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemInfo {
    /// Product variant name
    #[serde(default)]
    pub variant: Option<String>,
    /// Factory serial number
    pub serial_number: String,
    /// Firmware version
    pub sw_version: String,
    /// Hardware revision
    #[serde(default)]
    pub hw_version: Option<String>,
    /// Firmware build type (e.g. release, beta)
    #[serde(default)]
    pub build_type: Option<String>,
    /// User-assigned device name
    #[serde(default)]
    pub device_name: Option<String>,
}

/// State of one switch from `/api/switch/status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SwitchStatus {
    /// Switch identifier
    pub switch: u32,
    /// Whether the switch output is currently active
    pub active: bool,
    /// Whether the switch is locked against activation
    #[serde(default)]
    pub locked: Option<bool>,
    /// Whether the switch is held in its active state
    #[serde(default)]
    pub held: Option<bool>,
}

/// Actions accepted by `/api/switch/ctrl`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchAction {
    /// Latch the switch on
    On,
    /// Latch the switch off
    Off,
    /// Pulse the switch (momentary activation, used for door strikes)
    Trigger,
}

impl SwitchAction {
    /// Query-string value for the control endpoint
    pub fn as_str(&self) -> &'static str {
        match self {
            SwitchAction::On => "on",
            SwitchAction::Off => "off",
            SwitchAction::Trigger => "trigger",
        }
    }
}

impl std::fmt::Display for SwitchAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
