//! Command-line surface of the server entry point (§6).

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_filter_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "gabs")]
#[command(about = "Bridges AI agents to game mods over the Agent and Game protocols")]
#[command(version)]
pub struct Cli {
    /// Bind address for the HTTP transport (e.g. 127.0.0.1:8420). Omit for
    /// the stdio transport.
    #[arg(long = "http")]
    pub http: Option<String>,

    /// Root directory for per-game bridge artifacts and descriptor config.
    /// Defaults to `$GABS_CONFIG_DIR`, falling back to a platform config dir.
    #[arg(long = "configDir")]
    pub config_dir: Option<PathBuf>,

    /// Minimum log level. Defaults to `$GABS_LOG_LEVEL`, falling back to `info`.
    #[arg(long = "log-level", value_enum)]
    pub log_level: Option<LogLevel>,

    /// GP reconnect backoff envelope, e.g. `250ms..5s` or `100ms..inf`.
    #[arg(long = "reconnectBackoff", default_value = "250ms..5s")]
    pub reconnect_backoff: String,

    /// Stop grace period before a forced kill, e.g. `3s`.
    #[arg(long = "grace", default_value = "3s")]
    pub grace: String,

    /// Enable process-wide tool-name normalization (§3), storing the
    /// pre-normalization name in each tool's `meta.originalName`.
    #[arg(long = "normalize-tools")]
    pub normalize_tools: bool,

    /// Maximum normalized tool-name length. Non-positive falls back to the
    /// normalizer's default. Only meaningful with `--normalize-tools`.
    #[arg(long = "maxLength")]
    pub max_length: Option<i64>,
}
