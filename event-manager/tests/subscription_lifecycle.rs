//! Integration tests for subscription lifecycle and expiry recovery
//!
//! Run against a mock device; each test wires an EventSubscriptionManager
//! to a mockito server speaking the device's JSON envelope.

use std::sync::Arc;
use std::time::Duration;

use mockito::{Matcher, Server};
use tokio::sync::mpsc;

use device_client::{ClientConfig, DeviceClient};
use event_manager::{
    classify_all, ClassifierConfig, EventManagerConfig, EventManagerError,
    EventSubscriptionManager, SemanticAction,
};

fn test_client(server: &Server) -> Arc<DeviceClient> {
    let (host, port) = server
        .host_with_port()
        .split_once(':')
        .map(|(h, p)| (h.to_string(), p.parse::<u16>().unwrap()))
        .unwrap();
    Arc::new(DeviceClient::new(ClientConfig::new(host, "admin", "secret").with_port(port)).unwrap())
}

fn manager(server: &Server, config: EventManagerConfig) -> EventSubscriptionManager {
    EventSubscriptionManager::new(test_client(server), config).unwrap()
}

#[tokio::test]
async fn subscribe_stores_device_assigned_id() {
    let mut server = Server::new_async().await;

    let _subscribe = server
        .mock("GET", "/api/log/subscribe")
        .match_query(Matcher::Regex("include=".to_string()))
        .with_status(200)
        .with_body(r#"{"success": true, "result": {"id": "abc123"}}"#)
        .create_async()
        .await;

    let manager = manager(&server, EventManagerConfig::default());

    let id = manager.subscribe().await.unwrap();
    assert_eq!(id, "abc123");
    assert_eq!(manager.subscription_id().await.as_deref(), Some("abc123"));
}

#[tokio::test]
async fn pull_without_subscription_is_caller_error() {
    let server = Server::new_async().await;
    let manager = manager(&server, EventManagerConfig::default());

    assert!(matches!(
        manager.pull().await,
        Err(EventManagerError::NotSubscribed)
    ));
}

#[tokio::test]
async fn pull_returns_events_and_classification_finds_doorbell() {
    let mut server = Server::new_async().await;

    let _subscribe = server
        .mock("GET", "/api/log/subscribe")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"success": true, "result": {"id": "abc123"}}"#)
        .create_async()
        .await;

    let _pull = server
        .mock("GET", "/api/log/pull")
        .match_query(Matcher::UrlEncoded("id".to_string(), "abc123".to_string()))
        .with_status(200)
        .with_body(
            r#"{"success": true, "result": {"events": [
                {"id": 1, "utcTime": 1700000000, "upTime": 60,
                 "event": "KeyPressed", "params": {"key": "1"}}
            ]}}"#,
        )
        .create_async()
        .await;

    let manager = manager(&server, EventManagerConfig::default());
    manager.subscribe().await.unwrap();

    let events = manager.pull().await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, "KeyPressed");

    let actions = classify_all(
        &events,
        &ClassifierConfig {
            doorbell_button: Some("1".to_string()),
        },
    );
    assert_eq!(
        actions,
        vec![SemanticAction::DoorbellPressed {
            key: "1".to_string()
        }]
    );
}

#[tokio::test]
async fn expired_subscription_recovers_transparently() {
    let mut server = Server::new_async().await;

    // Subscribe must be hit twice: once up front, once for the recovery
    let subscribe = server
        .mock("GET", "/api/log/subscribe")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"success": true, "result": {"id": "abc123"}}"#)
        .expect(2)
        .create_async()
        .await;

    let _pull = server
        .mock("GET", "/api/log/pull")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"success": false, "error": {"code": 12, "message": "subscription not found"}}"#)
        .create_async()
        .await;

    let manager = manager(&server, EventManagerConfig::default());
    manager.subscribe().await.unwrap();

    // The expiry is swallowed: empty batch, no error, fresh subscription
    let events = manager.pull().await.unwrap();
    assert!(events.is_empty());
    assert_eq!(manager.subscription_id().await.as_deref(), Some("abc123"));

    subscribe.assert_async().await;
}

#[tokio::test]
async fn other_device_errors_surface_to_caller() {
    let mut server = Server::new_async().await;

    let _subscribe = server
        .mock("GET", "/api/log/subscribe")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"success": true, "result": {"id": "abc123"}}"#)
        .create_async()
        .await;

    let _pull = server
        .mock("GET", "/api/log/pull")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"success": false, "error": {"code": 8, "message": "invalid parameter"}}"#)
        .create_async()
        .await;

    let manager = manager(&server, EventManagerConfig::default());
    manager.subscribe().await.unwrap();

    match manager.pull().await {
        Err(EventManagerError::Client(device_client::ClientError::Device { code, .. })) => {
            assert_eq!(code, 8);
        }
        other => panic!("Expected device error, got {other:?}"),
    }
}

#[tokio::test]
async fn polling_loop_delivers_batches_and_stop_unsubscribes() {
    let mut server = Server::new_async().await;

    let _subscribe = server
        .mock("GET", "/api/log/subscribe")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"success": true, "result": {"id": "abc123"}}"#)
        .create_async()
        .await;

    let _pull = server
        .mock("GET", "/api/log/pull")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            r#"{"success": true, "result": {"events": [
                {"id": 9, "event": "InputChanged", "params": {"port": "door", "state": true}}
            ]}}"#,
        )
        .expect_at_least(1)
        .create_async()
        .await;

    let unsubscribe = server
        .mock("GET", "/api/log/unsubscribe")
        .match_query(Matcher::UrlEncoded("id".to_string(), "abc123".to_string()))
        .with_status(200)
        .with_body(r#"{"success": true}"#)
        .create_async()
        .await;

    let manager = manager(
        &server,
        EventManagerConfig::default().with_poll_interval(Duration::from_millis(20)),
    );
    manager.subscribe().await.unwrap();

    let (tx, mut rx) = mpsc::channel(8);
    manager.start_polling(tx.clone()).await;
    assert!(manager.is_polling().await);

    // Second start is a no-op
    manager.start_polling(tx).await;

    let batch = tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("poll loop produced no batch")
        .expect("channel closed unexpectedly");
    assert_eq!(batch[0].event_type, "InputChanged");

    manager.stop().await;
    assert!(!manager.is_polling().await);
    assert!(manager.subscription_id().await.is_none());
    unsubscribe.assert_async().await;
}
