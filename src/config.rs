use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, VaultError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub assets: AssetsConfig,
    #[serde(default)]
    pub folder_overrides: FolderOverrides,
}

impl Config {
    pub fn load(explicit_path: Option<&Path>, vault_root: &Path) -> Result<Self> {
        let mut config = Self::default();

        let explicit = explicit_path
            .map(PathBuf::from)
            .or_else(|| std::env::var("RECIPEVAULT_CONFIG").ok().map(PathBuf::from));

        if let Some(path) = explicit {
            if let Some(patch) = Self::load_patch(&path)? {
                config.merge_patch(patch);
            }
        } else {
            if let Some(global) = Self::load_global()? {
                config.merge_patch(global);
            }
            if let Some(project) = Self::load_project(vault_root)? {
                config.merge_patch(project);
            }
        }

        config.apply_env_overrides();

        Ok(config)
    }

    fn load_global() -> Result<Option<ConfigPatch>> {
        let Some(dir) = dirs::config_dir() else {
            return Ok(None);
        };
        Self::load_patch(&dir.join("recipevault/config.toml"))
    }

    fn load_project(vault_root: &Path) -> Result<Option<ConfigPatch>> {
        Self::load_patch(&vault_root.join("config.toml"))
    }

    fn load_patch(path: &Path) -> Result<Option<ConfigPatch>> {
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|err| VaultError::Config(format!("read config {}: {err}", path.display())))?;
        let patch = toml::from_str(&raw)
            .map_err(|err| VaultError::Config(format!("parse config {}: {err}", path.display())))?;
        Ok(Some(patch))
    }

    fn merge_patch(&mut self, patch: ConfigPatch) {
        if let Some(patch) = patch.store {
            if let Some(root) = patch.root {
                self.store.root = Some(root);
            }
        }
        if let Some(patch) = patch.assets {
            if let Some(root) = patch.root {
                self.assets.root = Some(root);
            }
        }
        if let Some(overrides) = patch.folder_overrides {
            self.folder_overrides.0.extend(overrides);
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(root) = std::env::var("RECIPEVAULT_STORE_ROOT") {
            self.store.root = Some(PathBuf::from(root));
        }
        if let Ok(root) = std::env::var("RECIPEVAULT_ASSETS_ROOT") {
            self.assets.root = Some(PathBuf::from(root));
        }
    }
}

/// Editable blob store location; defaults to `<vault_root>/store`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    pub root: Option<PathBuf>,
}

/// Static bundle location (the `assets/recipes` tree). Absent means no
/// bundle is available and the resolution chain has only the blob store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetsConfig {
    pub root: Option<PathBuf>,
}

/// Legacy id→folder corrections for records whose static bundle folder
/// never matched their id. Extended through configuration, never code.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FolderOverrides(pub HashMap<String, String>);

impl FolderOverrides {
    /// The folder identifier to use when fetching a record's static assets.
    #[must_use]
    pub fn effective_folder_id<'a>(&'a self, record_id: &'a str) -> &'a str {
        self.0.get(record_id).map_or(record_id, String::as_str)
    }
}

#[derive(Debug, Deserialize)]
struct ConfigPatch {
    store: Option<StorePatch>,
    assets: Option<AssetsPatch>,
    folder_overrides: Option<HashMap<String, String>>,
}

#[derive(Debug, Deserialize)]
struct StorePatch {
    root: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct AssetsPatch {
    root: Option<PathBuf>,
}
