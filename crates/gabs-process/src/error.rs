use thiserror::Error;

/// Process-lifecycle errors (§7 taxonomy items 2, 3, 6).
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("no free port in any configured range (last bind error: {source})")]
    PortExhaustion {
        #[source]
        source: std::io::Error,
    },

    #[error("failed to spawn game `{game_id}` (mode {launch_mode:?}, target `{target}`): {source}")]
    SpawnError {
        game_id: String,
        launch_mode: gabs_config::LaunchMode,
        target: String,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "game `{game_id}` has no stopProcessName; a launcher-mode game cannot be stopped \
         without one. Add `stopProcessName` to its descriptor naming the game's executable."
    )]
    LauncherStopUnsupported { game_id: String },

    #[error("operation requires state {expected:?}, controller is in {actual:?}")]
    InvalidState {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("process-table scanning is not supported on this platform")]
    UnsupportedPlatform,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] gabs_config::ConfigError),
}
