//! Game descriptors: the core's only input about what games exist (§3).
//!
//! Persisting descriptors and editing them interactively are explicitly out
//! of scope (§1); this crate only defines the descriptor shape, validates
//! it, and offers a minimal loader for the one file format the bridge
//! binary needs to boot from. A real deployment may swap that loader for a
//! richer config-management tool without touching the rest of the bridge.

mod error;
mod loader;
mod resolve;

pub use error::ConfigError;
pub use loader::load_descriptors;
pub use resolve::resolve_game_id;

use serde::{Deserialize, Serialize};

/// How the controller should launch a game's host process (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LaunchMode {
    DirectPath,
    SteamAppId,
    EpicAppId,
    CustomCommand,
}

impl LaunchMode {
    /// Launcher modes spawn a short-lived launcher, not the tracked game
    /// process itself (§4.2, §9 "Process identity vs launcher shielding").
    pub fn is_launcher(self) -> bool {
        matches!(self, LaunchMode::SteamAppId | LaunchMode::EpicAppId)
    }
}

/// A configured game, as handed to the core by its collaborator (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameDescriptor {
    pub id: String,
    pub launch_mode: LaunchMode,
    pub target: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub working_dir: Option<String>,
    #[serde(default)]
    pub stop_process_name: Option<String>,
}

impl GameDescriptor {
    /// Validate the invariant from §3: a launcher-mode descriptor with no
    /// `stopProcessName` is ill-formed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.id.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "id".to_string(),
            });
        }
        if self.target.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "target".to_string(),
            });
        }
        let stop_process_name_is_empty = self
            .stop_process_name
            .as_deref()
            .map(str::is_empty)
            .unwrap_or(true);
        if self.launch_mode.is_launcher() && stop_process_name_is_empty {
            return Err(ConfigError::LauncherMissingStopProcessName {
                game_id: self.id.clone(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn steam_descriptor(stop_process_name: Option<&str>) -> GameDescriptor {
        GameDescriptor {
            id: "rimworld".to_string(),
            launch_mode: LaunchMode::SteamAppId,
            target: "294100".to_string(),
            args: vec![],
            working_dir: None,
            stop_process_name: stop_process_name.map(str::to_string),
        }
    }

    #[test]
    fn launcher_mode_without_stop_process_name_is_ill_formed() {
        let descriptor = steam_descriptor(None);
        let err = descriptor.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::LauncherMissingStopProcessName { .. }
        ));
    }

    #[test]
    fn launcher_mode_with_stop_process_name_is_valid() {
        let descriptor = steam_descriptor(Some("RimWorldWin64.exe"));
        assert!(descriptor.validate().is_ok());
    }

    #[test]
    fn direct_path_never_needs_stop_process_name() {
        let descriptor = GameDescriptor {
            id: "x".to_string(),
            launch_mode: LaunchMode::DirectPath,
            target: "/bin/sleep".to_string(),
            args: vec!["30".to_string()],
            working_dir: None,
            stop_process_name: None,
        };
        assert!(descriptor.validate().is_ok());
    }

    #[test]
    fn empty_id_is_rejected() {
        let mut descriptor = steam_descriptor(Some("x.exe"));
        descriptor.id = "  ".to_string();
        assert!(matches!(
            descriptor.validate().unwrap_err(),
            ConfigError::MissingField { .. }
        ));
    }
}
