//! Subscription lifecycle and the periodic pull loop
//!
//! The manager holds the device-side subscription id and drives repeated
//! pulls at a fixed period. Expiry of the subscription (device error code
//! 12) is recovered transparently: local state is cleared, a resubscribe is
//! attempted immediately, and the affected tick reports an empty batch.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tokio::sync::{mpsc, Mutex, RwLock};
use tokio::task::JoinHandle;

use device_client::{paths, ClientError, DeviceClient, ERROR_SUBSCRIPTION_NOT_FOUND};

use crate::error::{EventManagerError, Result};
use crate::event::DeviceEvent;

/// Event categories subscribed to by default
pub const DEFAULT_CATEGORIES: [&str; 6] = [
    "KeyPressed",
    "KeyReleased",
    "InputChanged",
    "OutputChanged",
    "SwitchStateChanged",
    "CallStateChanged",
];

/// How long `stop()` waits for the poll task before aborting it
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for the event subscription manager
#[derive(Debug, Clone)]
pub struct EventManagerConfig {
    /// Fixed period between pulls, independent of pull duration
    /// Default: 1 second
    pub poll_interval: Duration,

    /// Server-side wait budget passed to the pull endpoint
    /// Default: 5 seconds
    pub pull_wait: Duration,

    /// Event categories requested at subscribe time
    /// Default: [`DEFAULT_CATEGORIES`]
    pub categories: Vec<String>,
}

impl Default for EventManagerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            pull_wait: Duration::from_secs(5),
            categories: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl EventManagerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_pull_wait(mut self, wait: Duration) -> Self {
        self.pull_wait = wait;
        self
    }

    pub fn with_categories(mut self, categories: Vec<String>) -> Self {
        self.categories = categories;
        self
    }

    /// Validate the configuration and return any issues
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval == Duration::ZERO {
            return Err(EventManagerError::Configuration(
                "Poll interval must be greater than 0".to_string(),
            ));
        }
        if self.categories.is_empty() {
            return Err(EventManagerError::Configuration(
                "At least one event category is required".to_string(),
            ));
        }
        Ok(())
    }
}

/// Handle to a running poll task
pub(crate) struct PollerHandle {
    pub(crate) task: JoinHandle<()>,
    pub(crate) shutdown_tx: mpsc::Sender<()>,
}

/// Manager for the device event subscription and pull loop
///
/// Raw events are delivered to the consumer as one batch per pull over the
/// channel passed to [`start_polling`](Self::start_polling); classification
/// is applied by the consumer on top (see [`crate::classify`]).
pub struct EventSubscriptionManager {
    client: Arc<DeviceClient>,
    config: EventManagerConfig,
    subscription: Arc<RwLock<Option<String>>>,
    poller: Mutex<Option<PollerHandle>>,
}

impl EventSubscriptionManager {
    /// Create a manager over an existing device client
    pub fn new(client: Arc<DeviceClient>, config: EventManagerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            client,
            config,
            subscription: Arc::new(RwLock::new(None)),
            poller: Mutex::new(None),
        })
    }

    /// Current subscription id, if subscribed
    pub async fn subscription_id(&self) -> Option<String> {
        self.subscription.read().await.clone()
    }

    /// Whether the poll loop is currently running
    pub async fn is_polling(&self) -> bool {
        self.poller.lock().await.is_some()
    }

    /// Request a subscription for the configured event categories
    ///
    /// Stores and returns the id the device assigned. Fails if the device
    /// rejects the subscription.
    pub async fn subscribe(&self) -> Result<String> {
        subscribe_device(&self.client, &self.config, &self.subscription).await
    }

    /// Cancel the current subscription, if any
    pub async fn unsubscribe(&self) -> Result<()> {
        let id = self.subscription.write().await.take();
        let Some(id) = id else {
            return Ok(());
        };

        self.client
            .request(paths::LOG_UNSUBSCRIBE, &[("id", id.clone())])
            .await?
            .ok()?;

        tracing::debug!(subscription = %id, "unsubscribed from device events");
        Ok(())
    }

    /// Pull pending events with the configured server-side wait budget
    ///
    /// Requires an active subscription. A pull answered with "subscription
    /// not found" clears local state, resubscribes, and reports the tick as
    /// empty; the consumer never sees the expiry.
    pub async fn pull(&self) -> Result<Vec<DeviceEvent>> {
        pull_events(&self.client, &self.config, &self.subscription).await
    }

    /// Start the periodic pull loop
    ///
    /// Idempotent: a no-op if the loop is already running. Each non-empty
    /// pull is sent as one batch over `events_tx`; the loop stops on its own
    /// if the receiver is dropped.
    pub async fn start_polling(&self, events_tx: mpsc::Sender<Vec<DeviceEvent>>) {
        let mut poller = self.poller.lock().await;
        if poller.is_some() {
            tracing::debug!("event polling already running");
            return;
        }

        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let task = tokio::spawn(poll_loop(
            Arc::clone(&self.client),
            self.config.clone(),
            Arc::clone(&self.subscription),
            events_tx,
            shutdown_rx,
        ));

        *poller = Some(PollerHandle { task, shutdown_tx });
    }

    /// Stop the poll loop and unsubscribe
    ///
    /// The timer is cancelled before the next tick fires; no further pulls
    /// are observable after this returns. Unsubscribe failures are swallowed
    /// since the subscription is being discarded anyway.
    pub async fn stop(&self) {
        let handle = self.poller.lock().await.take();
        if let Some(PollerHandle {
            mut task,
            shutdown_tx,
        }) = handle
        {
            let _ = shutdown_tx.send(()).await;
            if tokio::time::timeout(SHUTDOWN_TIMEOUT, &mut task).await.is_err() {
                // Mid-pull; the in-flight request is not worth waiting for
                task.abort();
            }
        }

        if let Err(error) = self.unsubscribe().await {
            tracing::warn!(error = %error, "unsubscribe during stop failed");
        }
    }
}

/// Payload of a successful subscribe response
#[derive(Deserialize)]
struct SubscribeResult {
    id: serde_json::Value,
}

/// Payload of a successful pull response
#[derive(Deserialize)]
struct PullResult {
    #[serde(default)]
    events: Vec<DeviceEvent>,
}

async fn subscribe_device(
    client: &DeviceClient,
    config: &EventManagerConfig,
    subscription: &RwLock<Option<String>>,
) -> Result<String> {
    let include = config.categories.join(",");
    let result = client
        .request(paths::LOG_SUBSCRIBE, &[("include", include)])
        .await?
        .result()?;

    let parsed: SubscribeResult = serde_json::from_value(result)
        .map_err(|_| EventManagerError::MissingSubscriptionId)?;

    // The device reports the id as a number; older firmware used strings
    let id = match parsed.id {
        serde_json::Value::String(s) => s,
        serde_json::Value::Number(n) => n.to_string(),
        _ => return Err(EventManagerError::MissingSubscriptionId),
    };

    tracing::info!(subscription = %id, "subscribed to device events");
    *subscription.write().await = Some(id.clone());
    Ok(id)
}

async fn pull_events(
    client: &DeviceClient,
    config: &EventManagerConfig,
    subscription: &RwLock<Option<String>>,
) -> Result<Vec<DeviceEvent>> {
    let id = subscription
        .read()
        .await
        .clone()
        .ok_or(EventManagerError::NotSubscribed)?;

    // The HTTP budget must cover the server-side wait plus transport time
    let budget = config.pull_wait + client.config().request_timeout;
    let envelope = client
        .request_with_timeout(
            paths::LOG_PULL,
            &[
                ("id", id.clone()),
                ("timeout", config.pull_wait.as_secs().to_string()),
            ],
            budget,
        )
        .await?;

    if let Some(error) = envelope.device_error() {
        if error.code == ERROR_SUBSCRIPTION_NOT_FOUND {
            tracing::info!(subscription = %id, "subscription expired, resubscribing");
            *subscription.write().await = None;
            if let Err(error) = subscribe_device(client, config, subscription).await {
                tracing::warn!(error = %error, "resubscribe after expiry failed");
            }
            return Ok(Vec::new());
        }
    }

    let result = envelope.result()?;
    let parsed: PullResult = serde_json::from_value(result)
        .map_err(|e| ClientError::Parse(format!("event pull: {e}")))?;
    Ok(parsed.events)
}

async fn poll_loop(
    client: Arc<DeviceClient>,
    config: EventManagerConfig,
    subscription: Arc<RwLock<Option<String>>>,
    events_tx: mpsc::Sender<Vec<DeviceEvent>>,
    mut shutdown_rx: mpsc::Receiver<()>,
) {
    // interval() ticks at a fixed period regardless of pull duration, which
    // is what the device expects for a live feed
    let mut ticker = tokio::time::interval(config.poll_interval);

    tracing::info!(interval_ms = config.poll_interval.as_millis() as u64, "event polling started");

    loop {
        tokio::select! {
            biased;

            _ = shutdown_rx.recv() => break,

            _ = ticker.tick() => {
                if subscription.read().await.is_none() {
                    if let Err(error) = subscribe_device(&client, &config, &subscription).await {
                        tracing::warn!(error = %error, "subscribe failed, retrying next tick");
                        continue;
                    }
                }

                match pull_events(&client, &config, &subscription).await {
                    Ok(events) if !events.is_empty() => {
                        if events_tx.send(events).await.is_err() {
                            tracing::debug!("event receiver dropped, stopping poll loop");
                            break;
                        }
                    }
                    Ok(_) => {}
                    // A failed pull never tears down the loop; the next tick
                    // retries independently
                    Err(error) => tracing::warn!(error = %error, "event pull failed"),
                }
            }
        }
    }

    tracing::info!("event polling stopped");
}
