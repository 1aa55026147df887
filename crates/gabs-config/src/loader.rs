//! Minimal descriptor-file loader.
//!
//! The wire/storage format for persistent game configuration is out of
//! scope (§1); this is the narrow boundary the bridge binary uses to turn a
//! TOML file into validated [`GameDescriptor`]s at startup.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use crate::{ConfigError, GameDescriptor};

#[derive(Debug, Deserialize)]
struct DescriptorFile {
    #[serde(default)]
    games: Vec<GameDescriptor>,
}

/// Load and validate all descriptors from `path` (a `[[games]]` array).
/// TOML is the primary format; a `.yaml`/`.yml` extension is accepted too,
/// matching the collaborator format this loader's shape was borrowed from.
/// Rejects ill-formed descriptors and duplicate ids.
pub fn load_descriptors(path: &Path) -> Result<Vec<GameDescriptor>, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let is_yaml = matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml") | Some("yml")
    );
    let parsed: DescriptorFile = if is_yaml {
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            reason: source.to_string(),
        })?
    } else {
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            reason: source.to_string(),
        })?
    };

    let mut seen = HashSet::new();
    for descriptor in &parsed.games {
        descriptor.validate()?;
        if !seen.insert(descriptor.id.clone()) {
            return Err(ConfigError::DuplicateId {
                id: descriptor.id.clone(),
            });
        }
    }

    Ok(parsed.games)
}
