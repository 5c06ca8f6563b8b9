//! Periodic switch-status polling
//!
//! Some installations need the switch state even when the device does not
//! emit a `SwitchStateChanged` event for it (e.g. a lock wired to an output
//! the firmware does not report). This poller reads the status endpoint on
//! its own task and forwards transitions only.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex};

use device_client::{DeviceClient, SwitchStatus};

use crate::manager::PollerHandle;

/// Polls one switch's status at a fixed period and reports transitions
pub struct SwitchStatusPoller {
    client: Arc<DeviceClient>,
    switch: u32,
    interval: Duration,
    handle: Mutex<Option<PollerHandle>>,
}

impl SwitchStatusPoller {
    /// Create a poller for `switch`, reading its status every `interval`
    pub fn new(client: Arc<DeviceClient>, switch: u32, interval: Duration) -> Self {
        Self {
            client,
            switch,
            interval,
            handle: Mutex::new(None),
        }
    }

    /// Start polling; a no-op if already running
    ///
    /// A status is sent on the first successful read and then only when the
    /// active flag changes.
    pub async fn start(&self, status_tx: mpsc::Sender<SwitchStatus>) {
        let mut handle = self.handle.lock().await;
        if handle.is_some() {
            tracing::debug!(switch = self.switch, "status polling already running");
            return;
        }

        let (shutdown_tx, mut shutdown_rx) = mpsc::channel(1);
        let client = Arc::clone(&self.client);
        let switch = self.switch;
        let interval = self.interval;

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            let mut last_active: Option<bool> = None;

            tracing::debug!(switch, "switch status polling started");

            loop {
                tokio::select! {
                    biased;

                    _ = shutdown_rx.recv() => break,

                    _ = ticker.tick() => {
                        match client.switch_status(switch).await {
                            Ok(status) => {
                                if last_active != Some(status.active) {
                                    last_active = Some(status.active);
                                    if status_tx.send(status).await.is_err() {
                                        tracing::debug!(switch, "status receiver dropped");
                                        break;
                                    }
                                }
                            }
                            Err(error) => {
                                tracing::warn!(switch, error = %error, "switch status poll failed");
                            }
                        }
                    }
                }
            }

            tracing::debug!(switch, "switch status polling stopped");
        });

        *handle = Some(PollerHandle { task, shutdown_tx });
    }

    /// Stop polling; a no-op if not running
    pub async fn stop(&self) {
        if let Some(PollerHandle { task, shutdown_tx }) = self.handle.lock().await.take() {
            let _ = shutdown_tx.send(()).await;
            let _ = task.await;
        }
    }
}
