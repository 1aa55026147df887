//! The abstract seam between the registries/dispatch layer and game
//! orchestration (process lifecycle + GP client + mirroring).
//!
//! gabs-server only knows how to expose `games.*` tools; it has no
//! dependency on the process controller, the GP client, or the mirror, so
//! it cannot wire them up itself. The binary crate that does own all of
//! those implements [`GameOrchestrator`] and hands the built-in tools a
//! trait object, which is what keeps this crate's dependency graph a leaf.

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

/// One line per configured game (`games.list`).
#[derive(Debug, Clone)]
pub struct GameSummary {
    pub id: String,
}

/// `games.show` response shape.
#[derive(Debug, Clone)]
pub struct GameDetail {
    pub id: String,
    pub launch_mode: String,
    pub target: String,
    pub args: Vec<String>,
    pub working_dir: Option<String>,
    pub stop_process_name: Option<String>,
    /// Set when the descriptor is ill-formed, e.g. a launcher mode with no
    /// `stopProcessName` (§3 invariant).
    pub validation_note: Option<String>,
}

/// `games.status` labels (§4.4 table).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    Running,
    Stopped,
    LauncherRunning,
    LauncherTriggered,
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            GameStatus::Running => "running",
            GameStatus::Stopped => "stopped",
            GameStatus::LauncherRunning => "launcher-running",
            GameStatus::LauncherTriggered => "launcher-triggered",
        };
        f.write_str(label)
    }
}

/// Orchestration failures surfaced to the agent as `isError: true` tool
/// results (§7 taxonomy), not JSON-RPC errors.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("unknown game `{0}`")]
    UnknownGame(String),

    #[error("game `{game_id}` is ill-formed: {reason}")]
    InvalidDescriptor { game_id: String, reason: String },

    #[error("game `{0}` is already running")]
    AlreadyRunning(String),

    #[error("game `{0}` is not running")]
    NotRunning(String),

    #[error("no free port: {0}")]
    PortExhaustion(String),

    #[error("failed to launch {game_id} ({launch_mode} -> {target}): {reason}")]
    SpawnError {
        game_id: String,
        launch_mode: String,
        target: String,
        reason: String,
    },

    #[error("game `{0}` uses a launcher with no stopProcessName configured; stop/kill is unsupported")]
    LauncherStopUnsupported(String),

    #[error("{0}")]
    Internal(String),
}

/// The operations the built-in `games.*` tools need (§4.4).
#[async_trait]
pub trait GameOrchestrator: Send + Sync {
    async fn list(&self) -> Vec<GameSummary>;

    async fn show(&self, game_id: &str) -> Result<GameDetail, OrchestratorError>;

    /// `None` requests status for every configured game.
    async fn status(&self, game_id: Option<&str>) -> Result<Vec<(String, GameStatus)>, OrchestratorError>;

    async fn start(&self, game_id: &str) -> Result<(), OrchestratorError>;

    async fn stop(&self, game_id: &str) -> Result<(), OrchestratorError>;

    async fn kill(&self, game_id: &str) -> Result<(), OrchestratorError>;
}
