//! One [`Mirror`] per live game: owns the reconnector and the event log,
//! and is the handle the orchestrator holds to tear everything down again
//! (§4.5).

use std::sync::Arc;

use gabs_gp_client::{BackoffConfig, LaunchIdentity};
use gabs_server::Registries;

use crate::reconnect::{self, ReconnectHandle};
use crate::ring_buffer::EventLog;

pub struct Mirror {
    game_id: String,
    reconnector: ReconnectHandle,
}

impl Mirror {
    /// Start a reconnector for `game_id` against the GP server at `port`,
    /// and register its event-log resource. Tool registration happens
    /// asynchronously once the first handshake completes.
    pub fn start(
        game_id: String,
        port: u16,
        token: String,
        identity: LaunchIdentity,
        backoff: BackoffConfig,
        registries: Arc<Registries>,
    ) -> Self {
        let event_log = Arc::new(EventLog::default());
        let reconnector = reconnect::spawn(game_id.clone(), port, token, identity, backoff, event_log, registries);
        Self { game_id, reconnector }
    }

    pub fn game_id(&self) -> &str {
        &self.game_id
    }

    /// Cancel the reconnector. Callers still need to invoke the bridge
    /// server's `CleanupGameResources(gameId)` to remove this game's tool
    /// and resource registrations (§4.5 "Cleanup on game stop").
    pub async fn shutdown(self) {
        self.reconnector.cancel().await;
    }
}
