//! The bridge artifact file (§6): the short-lived authorization document a
//! mod reads to learn which port/token to accept a connection on.

use std::path::{Path, PathBuf};

use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Exact on-disk shape, `<configRoot>/<gameId>/bridge.json` (§6).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeArtifact {
    pub port: u16,
    pub token: String,
    pub game_id: String,
}

/// 64 lowercase hex characters, per §6.
pub fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn artifact_path(config_root: &Path, game_id: &str) -> PathBuf {
    config_root.join(game_id).join("bridge.json")
}

/// Write the artifact atomically: serialize to `<path>.tmp`, then rename
/// over the final path (§6).
pub async fn write_artifact(
    config_root: &Path,
    artifact: &BridgeArtifact,
) -> std::io::Result<PathBuf> {
    let dir = config_root.join(&artifact.game_id);
    tokio::fs::create_dir_all(&dir).await?;

    let path = artifact_path(config_root, &artifact.game_id);
    let tmp_path = path.with_extension("json.tmp");

    let body = serde_json::to_string_pretty(artifact)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    tokio::fs::write(&tmp_path, body).await?;
    tokio::fs::rename(&tmp_path, &path).await?;
    Ok(path)
}

pub async fn read_artifact(config_root: &Path, game_id: &str) -> std::io::Result<BridgeArtifact> {
    let path = artifact_path(config_root, game_id);
    let body = tokio::fs::read_to_string(&path).await?;
    serde_json::from_str(&body).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

/// Best-effort removal on successful stop/kill; a missing file is not an
/// error (§4.2 "Always attempt to clean up the bridge artifact file").
pub async fn remove_artifact(config_root: &Path, game_id: &str) -> std::io::Result<()> {
    let path = artifact_path(config_root, game_id);
    match tokio::fs::remove_file(&path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_tokens_are_64_lowercase_hex_chars() {
        let token = generate_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[tokio::test]
    async fn write_then_read_round_trips(
    ) {
        let dir = tempfile::tempdir().unwrap();
        let artifact = BridgeArtifact {
            port: 54321,
            token: generate_token(),
            game_id: "rimworld".to_string(),
        };

        let path = write_artifact(dir.path(), &artifact).await.unwrap();
        assert!(path.ends_with("rimworld/bridge.json"));

        let read_back = read_artifact(dir.path(), "rimworld").await.unwrap();
        assert_eq!(read_back, artifact);
    }

    #[tokio::test]
    async fn write_leaves_no_tmp_file_behind() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = BridgeArtifact {
            port: 1,
            token: generate_token(),
            game_id: "x".to_string(),
        };
        write_artifact(dir.path(), &artifact).await.unwrap();
        assert!(!dir.path().join("x/bridge.json.tmp").exists());
    }

    #[tokio::test]
    async fn remove_is_idempotent_when_the_file_is_already_gone() {
        let dir = tempfile::tempdir().unwrap();
        assert!(remove_artifact(dir.path(), "never-started").await.is_ok());
    }
}
