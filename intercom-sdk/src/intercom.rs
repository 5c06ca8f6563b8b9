//! The top-level device handle

use std::sync::Arc;

use device_client::{ClientConfig, DeviceClient, SystemInfo};
use event_manager::{EventManagerConfig, EventSubscriptionManager};
use stream_manager::{StreamSessionManager, TranscoderConfig};

use crate::error::Result;

/// One intercom device: client, event stream, and streaming sessions
///
/// All three components share a single [`DeviceClient`], so the cached
/// authentication challenge is negotiated once per device, not per concern.
pub struct Intercom {
    client: Arc<DeviceClient>,
    events: EventSubscriptionManager,
    streams: StreamSessionManager,
}

impl Intercom {
    /// Create a handle with default event and transcoder settings
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::with_configs(config, EventManagerConfig::default(), TranscoderConfig::default())
    }

    /// Create a handle with explicit per-component settings
    pub fn with_configs(
        client_config: ClientConfig,
        event_config: EventManagerConfig,
        transcoder_config: TranscoderConfig,
    ) -> Result<Self> {
        let client = Arc::new(DeviceClient::new(client_config)?);
        let events = EventSubscriptionManager::new(Arc::clone(&client), event_config)?;
        let streams = StreamSessionManager::new(Arc::clone(&client), transcoder_config);

        Ok(Self {
            client,
            events,
            streams,
        })
    }

    /// Probe the device until it answers
    ///
    /// A device that is offline or rebooting is retried on the client's
    /// configured backoff rather than surfaced as a permanent outage; this
    /// only returns once the device has identified itself.
    pub async fn connect(&self) -> SystemInfo {
        let info = self.client.system_info_with_retry().await;
        tracing::info!(
            host = %self.client.config().host,
            serial = %info.serial_number,
            firmware = %info.sw_version,
            "connected to intercom"
        );
        info
    }

    /// The shared device client for one-shot operations
    pub fn client(&self) -> &Arc<DeviceClient> {
        &self.client
    }

    /// The event subscription manager
    pub fn events(&self) -> &EventSubscriptionManager {
        &self.events
    }

    /// The streaming session manager
    pub fn streams(&self) -> &StreamSessionManager {
        &self.streams
    }

    /// Stop background activity: polling, subscription, and all sessions
    pub async fn shutdown(&self) {
        self.events.stop().await;
        self.streams.stop_all().await;
    }
}
