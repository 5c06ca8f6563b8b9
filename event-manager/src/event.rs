//! Raw device events from the log pull endpoint

use serde::Deserialize;
use std::collections::HashMap;

/// A raw event pulled from the device log API
///
/// Ephemeral: events are handed to the consumer as they arrive and are not
/// persisted anywhere. Parameters stay as a string-to-scalar map; the
/// classifier reads the keys it knows and everything else passes through.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceEvent {
    /// Monotonic event id assigned by the device
    pub id: u64,
    /// Device wall-clock timestamp, seconds since the UNIX epoch
    #[serde(default)]
    pub utc_time: u64,
    /// Seconds since device boot
    #[serde(default)]
    pub up_time: u64,
    /// Event type name, e.g. `KeyPressed`
    #[serde(rename = "event")]
    pub event_type: String,
    /// Event-specific parameters
    #[serde(default)]
    pub params: HashMap<String, serde_json::Value>,
}

impl DeviceEvent {
    /// Read a parameter as a string, stringifying scalar values
    pub fn param_str(&self, key: &str) -> Option<String> {
        match self.params.get(key)? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            serde_json::Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Read a parameter as a boolean, accepting `true`/`false` strings too
    pub fn param_bool(&self, key: &str) -> Option<bool> {
        match self.params.get(key)? {
            serde_json::Value::Bool(b) => Some(*b),
            serde_json::Value::String(s) => match s.as_str() {
                "true" | "1" => Some(true),
                "false" | "0" => Some(false),
                _ => None,
            },
            serde_json::Value::Number(n) => n.as_i64().map(|v| v != 0),
            _ => None,
        }
    }
}
