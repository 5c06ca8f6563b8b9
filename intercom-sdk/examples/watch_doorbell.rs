//! Watch a device's event stream and react to the doorbell button.
//!
//! Usage: `cargo run --example watch_doorbell -- <host> <user> <password>`

use intercom_sdk::{
    classify_all, ClassifierConfig, ClientConfig, Intercom, SemanticAction,
};
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> Result<(), intercom_sdk::IntercomError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let host = args.next().unwrap_or_else(|| "192.168.1.50".to_string());
    let user = args.next().unwrap_or_else(|| "admin".to_string());
    let password = args.next().unwrap_or_default();

    let intercom = Intercom::new(ClientConfig::new(host, user, password))?;

    let info = intercom.connect().await;
    println!(
        "connected: {} (firmware {})",
        info.device_name.as_deref().unwrap_or("unnamed"),
        info.sw_version
    );

    intercom.events().subscribe().await?;

    let (tx, mut rx) = mpsc::channel(16);
    intercom.events().start_polling(tx).await;

    let classifier = ClassifierConfig {
        doorbell_button: Some("1".to_string()),
    };

    println!("watching for events, ctrl-c to stop");
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            batch = rx.recv() => {
                let Some(batch) = batch else { break };
                for action in classify_all(&batch, &classifier) {
                    println!("-> {action:?}");
                    if matches!(action, SemanticAction::DoorbellPressed { .. }) {
                        // Pulse the door strike for demonstration purposes
                        intercom.client().unlock_door(1).await?;
                    }
                }
            }
        }
    }

    intercom.shutdown().await;
    Ok(())
}
