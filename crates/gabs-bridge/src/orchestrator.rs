//! The concrete [`GameOrchestrator`]: the one place in the workspace that
//! wires the process controller, the GP client, and the mirror together
//! (§4.2-§4.5). Everything upstream of this only sees the trait.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use gabs_config::GameDescriptor;
use gabs_gp_client::{BackoffConfig, LaunchIdentity};
use gabs_process::{BridgeEnv, PortAllocator, ProcessController};
use gabs_server::{GameDetail, GameOrchestrator, GameStatus, GameSummary, OrchestratorError, Registries};
use tokio::sync::Mutex as AsyncMutex;

struct LiveGame {
    controller: AsyncMutex<ProcessController>,
    mirror: AsyncMutex<Option<gabs_mirror::Mirror>>,
    port: u16,
}

pub struct BridgeOrchestrator {
    descriptors: HashMap<String, GameDescriptor>,
    config_root: PathBuf,
    live: DashMap<String, Arc<LiveGame>>,
    ports: PortAllocator,
    backoff: BackoffConfig,
    grace: Duration,
    registries: Arc<Registries>,
    bridge_version: String,
}

impl BridgeOrchestrator {
    pub fn new(
        descriptors: Vec<GameDescriptor>,
        config_root: PathBuf,
        backoff: BackoffConfig,
        grace: Duration,
        registries: Arc<Registries>,
    ) -> Self {
        Self {
            descriptors: descriptors.into_iter().map(|d| (d.id.clone(), d)).collect(),
            config_root,
            live: DashMap::new(),
            ports: PortAllocator::with_defaults(),
            backoff,
            grace,
            registries,
            bridge_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Resolve `input` against the configured descriptors, exact id first
    /// then a linear scan by `target` (`gabs_config::resolve_game_id`'s
    /// shape, mirrored here since that helper takes a slice and our
    /// descriptors live in a map keyed by id).
    fn resolve(&self, input: &str) -> Option<&GameDescriptor> {
        self.descriptors
            .get(input)
            .or_else(|| self.descriptors.values().find(|d| d.target == input))
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn live_game_ids(&self) -> Vec<String> {
        self.live.iter().map(|e| e.key().clone()).collect()
    }

    /// Shut down every live game's reconnector; called on process exit
    /// (§5 shutdown policy). Does not stop the underlying game processes.
    pub async fn shutdown_mirrors(&self) {
        let entries: Vec<_> = self.live.iter().map(|e| Arc::clone(e.value())).collect();
        for entry in entries {
            if let Some(mirror) = entry.mirror.lock().await.take() {
                mirror.shutdown().await;
            }
        }
    }
}

#[async_trait]
impl GameOrchestrator for BridgeOrchestrator {
    async fn list(&self) -> Vec<GameSummary> {
        self.descriptors.keys().map(|id| GameSummary { id: id.clone() }).collect()
    }

    async fn show(&self, game_id: &str) -> Result<GameDetail, OrchestratorError> {
        let descriptor = self.resolve(game_id).ok_or_else(|| OrchestratorError::UnknownGame(game_id.to_string()))?;
        let validation_note = descriptor.validate().err().map(|e| e.to_string());
        Ok(GameDetail {
            id: descriptor.id.clone(),
            launch_mode: format!("{:?}", descriptor.launch_mode),
            target: descriptor.target.clone(),
            args: descriptor.args.clone(),
            working_dir: descriptor.working_dir.clone(),
            stop_process_name: descriptor.stop_process_name.clone(),
            validation_note,
        })
    }

    async fn status(&self, game_id: Option<&str>) -> Result<Vec<(String, GameStatus)>, OrchestratorError> {
        let ids: Vec<String> = match game_id {
            Some(input) => {
                let descriptor = self.resolve(input).ok_or_else(|| OrchestratorError::UnknownGame(input.to_string()))?;
                vec![descriptor.id.clone()]
            }
            None => self.descriptors.keys().cloned().collect(),
        };

        let mut rows = Vec::with_capacity(ids.len());
        for id in ids {
            let status = match self.live.get(&id) {
                Some(entry) => {
                    let entry = Arc::clone(entry.value());
                    let label = entry.controller.lock().await.status_label();
                    map_status_label(label)
                }
                None => GameStatus::Stopped,
            };
            rows.push((id, status));
        }
        Ok(rows)
    }

    async fn start(&self, game_id: &str) -> Result<(), OrchestratorError> {
        let descriptor = self
            .resolve(game_id)
            .ok_or_else(|| OrchestratorError::UnknownGame(game_id.to_string()))?
            .clone();

        if let Some(entry) = self.live.get(&descriptor.id) {
            let entry = Arc::clone(entry.value());
            if entry.controller.lock().await.is_running() {
                return Err(OrchestratorError::AlreadyRunning(descriptor.id.clone()));
            }
        }

        descriptor.validate().map_err(|e| OrchestratorError::InvalidDescriptor {
            game_id: descriptor.id.clone(),
            reason: e.to_string(),
        })?;

        let port = self
            .ports
            .allocate()
            .map_err(|e| OrchestratorError::PortExhaustion(e.to_string()))?;
        let token = gabs_process::generate_token();

        let artifact = gabs_process::BridgeArtifact {
            port,
            token: token.clone(),
            game_id: descriptor.id.clone(),
        };
        let artifact_path = gabs_process::write_artifact(&self.config_root, &artifact)
            .await
            .map_err(|e| OrchestratorError::SpawnError {
                game_id: descriptor.id.clone(),
                launch_mode: format!("{:?}", descriptor.launch_mode),
                target: descriptor.target.clone(),
                reason: e.to_string(),
            })?;

        let mut controller = ProcessController::configure(descriptor.clone()).map_err(|e| OrchestratorError::InvalidDescriptor {
            game_id: descriptor.id.clone(),
            reason: e.to_string(),
        })?;
        let bridge_env = BridgeEnv::new(descriptor.id.clone(), port, token.clone(), &artifact_path);
        controller.start(&bridge_env).await.map_err(|e| OrchestratorError::SpawnError {
            game_id: descriptor.id.clone(),
            launch_mode: format!("{:?}", descriptor.launch_mode),
            target: descriptor.target.clone(),
            reason: e.to_string(),
        })?;

        let identity = LaunchIdentity {
            bridge_version: self.bridge_version.clone(),
            platform: std::env::consts::OS.to_string(),
            launch_id: uuid::Uuid::new_v4().to_string(),
        };
        let mirror = gabs_mirror::Mirror::start(
            descriptor.id.clone(),
            port,
            token,
            identity,
            self.backoff.clone(),
            Arc::clone(&self.registries),
        );

        self.live.insert(
            descriptor.id.clone(),
            Arc::new(LiveGame {
                controller: AsyncMutex::new(controller),
                mirror: AsyncMutex::new(Some(mirror)),
                port,
            }),
        );
        Ok(())
    }

    async fn stop(&self, game_id: &str) -> Result<(), OrchestratorError> {
        self.stop_or_kill(game_id, Some(self.grace)).await
    }

    async fn kill(&self, game_id: &str) -> Result<(), OrchestratorError> {
        self.stop_or_kill(game_id, None).await
    }
}

impl BridgeOrchestrator {
    async fn stop_or_kill(&self, game_id: &str, grace: Option<Duration>) -> Result<(), OrchestratorError> {
        let descriptor = self.resolve(game_id).ok_or_else(|| OrchestratorError::UnknownGame(game_id.to_string()))?;
        let id = descriptor.id.clone();

        let entry = self
            .live
            .get(&id)
            .map(|e| Arc::clone(e.value()))
            .ok_or_else(|| OrchestratorError::NotRunning(id.clone()))?;

        {
            let mut controller = entry.controller.lock().await;
            let result = match grace {
                Some(grace) => controller.stop(grace, &self.config_root).await,
                None => controller.kill(&self.config_root).await,
            };
            result.map_err(|e| map_process_error(&id, e))?;
        }

        if let Some(mirror) = entry.mirror.lock().await.take() {
            mirror.shutdown().await;
        }
        let (tools_removed, resources_removed) = self.registries.cleanup_game_resources(&id);
        if tools_removed {
            self.registries.broadcast_list_changed("tools/list_changed");
        }
        if resources_removed {
            self.registries.broadcast_list_changed("resources/list_changed");
        }
        self.live.remove(&id);
        Ok(())
    }
}

fn map_status_label(label: gabs_process::StatusLabel) -> GameStatus {
    match label {
        gabs_process::StatusLabel::Running => GameStatus::Running,
        gabs_process::StatusLabel::Stopped => GameStatus::Stopped,
        gabs_process::StatusLabel::LauncherRunning => GameStatus::LauncherRunning,
        gabs_process::StatusLabel::LauncherTriggered => GameStatus::LauncherTriggered,
    }
}

fn map_process_error(game_id: &str, err: gabs_process::ProcessError) -> OrchestratorError {
    match err {
        gabs_process::ProcessError::LauncherStopUnsupported { .. } => {
            OrchestratorError::LauncherStopUnsupported(game_id.to_string())
        }
        other => OrchestratorError::Internal(other.to_string()),
    }
}
