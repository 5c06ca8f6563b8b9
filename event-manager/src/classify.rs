//! Classification of raw device events into semantic actions
//!
//! A pure mapping layered on top of the raw event stream. The manager does
//! not hide this behind its polling loop; consumers receive raw events and
//! apply [`classify`] themselves, so unknown event types stay visible.

use crate::event::DeviceEvent;

/// Consumer-side configuration for event classification
#[derive(Debug, Clone, Default)]
pub struct ClassifierConfig {
    /// Identifier of the physical button that acts as the doorbell
    ///
    /// A `KeyPressed` event whose key matches this identifier classifies as
    /// a doorbell trigger instead of a plain key press.
    pub doorbell_button: Option<String>,
}

/// Closed set of semantic actions derived from raw events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SemanticAction {
    /// The configured doorbell button was pressed
    DoorbellPressed {
        /// Key identifier reported by the device
        key: String,
    },
    /// A physical key other than the configured doorbell was pressed
    KeyPressed {
        /// Key identifier reported by the device
        key: String,
    },
    /// A binary input, output, or switch transitioned
    BinaryStateChanged {
        /// Port or switch identifier
        port: String,
        /// New state
        active: bool,
    },
    /// A call entered the ringing state
    CallRinging,
    /// An outgoing call was started
    CallOutgoing,
}

/// Map one raw event onto a semantic action
///
/// Returns `None` for event types or parameter shapes the mapping does not
/// recognize; those events still reach the consumer raw.
pub fn classify(event: &DeviceEvent, config: &ClassifierConfig) -> Option<SemanticAction> {
    match event.event_type.as_str() {
        "KeyPressed" => {
            let key = event.param_str("key")?;
            if config.doorbell_button.as_deref() == Some(key.as_str()) {
                Some(SemanticAction::DoorbellPressed { key })
            } else {
                Some(SemanticAction::KeyPressed { key })
            }
        }
        "InputChanged" | "OutputChanged" => {
            let port = event.param_str("port")?;
            let active = event.param_bool("state")?;
            Some(SemanticAction::BinaryStateChanged { port, active })
        }
        "SwitchStateChanged" => {
            let port = event.param_str("switch")?;
            let active = event.param_bool("state")?;
            Some(SemanticAction::BinaryStateChanged { port, active })
        }
        "CallStateChanged" => match event.param_str("state")?.as_str() {
            "ringing" => Some(SemanticAction::CallRinging),
            "connecting" => Some(SemanticAction::CallOutgoing),
            _ => None,
        },
        _ => None,
    }
}

/// Classify a pulled batch, dropping events the mapping does not cover
pub fn classify_all(events: &[DeviceEvent], config: &ClassifierConfig) -> Vec<SemanticAction> {
    events
        .iter()
        .filter_map(|event| classify(event, config))
        .collect()
}
