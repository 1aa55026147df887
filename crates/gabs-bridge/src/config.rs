//! Resolves the config root and descriptor file, and the log-level
//! precedence between the CLI flag and `GABS_LOG_LEVEL` (§6).

use std::path::PathBuf;

use anyhow::{Context, Result};
use gabs_config::GameDescriptor;

use crate::cli::{Cli, LogLevel};

const CONFIG_DIR_ENV: &str = "GABS_CONFIG_DIR";
const LOG_LEVEL_ENV: &str = "GABS_LOG_LEVEL";
const DESCRIPTOR_FILE: &str = "games.toml";
const DESCRIPTOR_FILE_CANDIDATES: &[&str] = &["games.toml", "games.yaml", "games.yml"];

pub fn resolve_config_root(cli: &Cli) -> Result<PathBuf> {
    if let Some(path) = &cli.config_dir {
        return Ok(path.clone());
    }
    if let Ok(path) = std::env::var(CONFIG_DIR_ENV) {
        return Ok(PathBuf::from(path));
    }
    dirs::config_dir()
        .map(|dir| dir.join("gabs"))
        .context("could not determine a platform config directory; pass --configDir")
}

pub fn resolve_log_filter(cli: &Cli) -> String {
    if let Some(level) = cli.log_level {
        return level.as_filter_str().to_string();
    }
    if let Ok(level) = std::env::var(LOG_LEVEL_ENV) {
        return level;
    }
    LogLevel::Info.as_filter_str().to_string()
}

/// Finds the first existing descriptor file among `games.toml`/`games.yaml`/
/// `games.yml` in `config_root`, preferring TOML, and loads it. Falls back
/// to the TOML path (which will surface a clear "not found" error) when none
/// of the candidates exist.
/// `None` unless `--normalize-tools` was passed (§3/§4.4 "process-wide
/// normalization option").
pub fn resolve_normalize_config(cli: &Cli) -> Option<gabs_server::NormalizeConfig> {
    cli.normalize_tools
        .then(|| gabs_server::NormalizeConfig::with_max_length(cli.max_length.unwrap_or(0)))
}

pub fn load_descriptors(config_root: &std::path::Path) -> Result<Vec<GameDescriptor>> {
    let path = DESCRIPTOR_FILE_CANDIDATES
        .iter()
        .map(|name| config_root.join(name))
        .find(|candidate| candidate.is_file())
        .unwrap_or_else(|| config_root.join(DESCRIPTOR_FILE));
    gabs_config::load_descriptors(&path).with_context(|| format!("loading {}", path.display()))
}
