//! Per-child environment variables (§6, §9 "Per-child environment
//! isolation").
//!
//! Built as an explicit structure and passed per-spawn; never written into
//! the parent process's environment. This is what keeps two concurrent
//! `games.start` calls from leaking each other's token.

use std::path::Path;

/// The four variables injected into a spawned game's environment.
#[derive(Debug, Clone)]
pub struct BridgeEnv {
    pub game_id: String,
    pub port: u16,
    pub token: String,
    pub bridge_path: String,
}

impl BridgeEnv {
    pub fn new(game_id: impl Into<String>, port: u16, token: impl Into<String>, bridge_path: &Path) -> Self {
        Self {
            game_id: game_id.into(),
            port,
            token: token.into(),
            bridge_path: bridge_path.display().to_string(),
        }
    }

    /// `(name, value)` pairs suitable for `Command::envs`.
    pub fn as_pairs(&self) -> [(&'static str, String); 4] {
        [
            ("GABS_GAME_ID", self.game_id.clone()),
            ("GABP_SERVER_PORT", self.port.to_string()),
            ("GABP_TOKEN", self.token.clone()),
            ("GABS_BRIDGE_PATH", self.bridge_path.clone()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_carry_every_documented_variable() {
        let env = BridgeEnv::new("rimworld", 54321, "a".repeat(64), Path::new("/tmp/rimworld/bridge.json"));
        let pairs = env.as_pairs();
        let names: Vec<_> = pairs.iter().map(|(n, _)| *n).collect();
        assert_eq!(
            names,
            ["GABS_GAME_ID", "GABP_SERVER_PORT", "GABP_TOKEN", "GABS_BRIDGE_PATH"]
        );
        assert_eq!(pairs[1].1, "54321");
    }
}
