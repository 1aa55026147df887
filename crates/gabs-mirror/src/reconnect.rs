//! Background reconnector: one per live game (§5 "Scheduling model").
//!
//! Dials, syncs tools, exposes the event-log resource, subscribes to every
//! channel the mod advertised, then polls liveness until the connection is
//! lost and the cycle repeats. Cancelled when the live-game entry is
//! removed (§5 "A GP reconnect loop is cancelled when the live-game entry
//! is removed").

use std::sync::Arc;
use std::time::Duration;

use gabs_gp_client::{BackoffConfig, GpClient, LaunchIdentity};
use gabs_server::Registries;
use serde_json::json;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::ring_buffer::EventLog;
use crate::sync::{expose_resources, sync_tools};

const LIVENESS_POLL: Duration = Duration::from_secs(10);

pub struct ReconnectHandle {
    cancel: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl ReconnectHandle {
    pub async fn cancel(self) {
        let _ = self.cancel.send(());
        let _ = self.task.await;
    }
}

/// Spawn the reconnect loop. `resources_exposed_once` is left to the
/// caller's discretion via `expose_resources`'s own idempotent
/// registration (re-registering the same URI simply overwrites it).
pub fn spawn(
    game_id: String,
    port: u16,
    token: String,
    identity: LaunchIdentity,
    backoff: BackoffConfig,
    event_log: Arc<EventLog>,
    registries: Arc<Registries>,
) -> ReconnectHandle {
    let (cancel_tx, mut cancel_rx) = oneshot::channel();

    let task = tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = &mut cancel_rx => return,
                client = GpClient::connect(port, &token, identity.clone(), &backoff) => {
                    match client {
                        Ok(client) => {
                            let client = Arc::new(client);
                            if let Err(err) = sync_tools(&game_id, &client, &registries).await {
                                tracing::warn!(game_id = %game_id, error = %err, "initial tool sync failed");
                            }
                            expose_resources(&game_id, Arc::clone(&event_log), &registries);

                            let channels = client.capabilities().events.clone();
                            if !channels.is_empty() {
                                let log_for_events = Arc::clone(&event_log);
                                let subscribe_result = client
                                    .subscribe_events(
                                        channels,
                                        Arc::new(move |event| log_for_events.push(event)),
                                    )
                                    .await;
                                if let Err(err) = subscribe_result {
                                    tracing::warn!(game_id = %game_id, error = %err, "event subscription failed");
                                }
                            }

                            if !hold_until_disconnected(&client, &mut cancel_rx).await {
                                return;
                            }
                            tracing::info!(game_id = %game_id, "GP connection lost, reconnecting");
                        }
                        Err(err) => {
                            tracing::warn!(game_id = %game_id, error = %err, "GP connect attempt exhausted, retrying");
                        }
                    }
                }
            }
        }
    });

    ReconnectHandle { cancel: cancel_tx, task }
}

/// Poll liveness with a lightweight request until it fails or cancellation
/// fires. Returns `false` if cancelled, `true` if the connection was lost
/// and the caller should redial.
async fn hold_until_disconnected(client: &GpClient, cancel_rx: &mut oneshot::Receiver<()>) -> bool {
    loop {
        tokio::select! {
            _ = &mut *cancel_rx => return false,
            _ = tokio::time::sleep(LIVENESS_POLL) => {
                if client.request("tools/list", json!({})).await.is_err() {
                    return true;
                }
            }
        }
    }
}
