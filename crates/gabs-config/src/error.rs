use thiserror::Error;

/// ConfigError (§7 taxonomy item 1): descriptor validation failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required field `{field}`")]
    MissingField { field: String },

    #[error(
        "game `{game_id}` uses a launcher mode but has no stopProcessName; \
         the real game process cannot be tracked or stopped without it"
    )]
    LauncherMissingStopProcessName { game_id: String },

    #[error("unknown launch mode `{mode}`")]
    UnknownLaunchMode { mode: String },

    #[error("failed to read descriptor file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse descriptor file {path}: {reason}")]
    Parse { path: String, reason: String },

    #[error("duplicate game id `{id}`")]
    DuplicateId { id: String },
}
