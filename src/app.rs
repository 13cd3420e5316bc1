use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::store::{FsFileStore, FsStaticAssets, NoStaticAssets, StaticAssets};

pub struct AppContext {
    pub vault_root: PathBuf,
    pub config: Config,
    pub store: Arc<FsFileStore>,
    pub assets: Arc<dyn StaticAssets>,
}

impl AppContext {
    pub fn from_cli(cli: &crate::cli::Cli) -> Result<Self> {
        let vault_root = Self::find_vault_root()?;
        let config = Config::load(cli.config.as_deref(), &vault_root)?;

        let store_root = config
            .store
            .root
            .clone()
            .unwrap_or_else(|| vault_root.join("store"));
        let store = Arc::new(FsFileStore::open(store_root)?);

        let assets: Arc<dyn StaticAssets> = match &config.assets.root {
            Some(root) => Arc::new(FsStaticAssets::new(root)),
            None => Arc::new(NoStaticAssets),
        };

        Ok(Self {
            vault_root,
            config,
            store,
            assets,
        })
    }

    fn find_vault_root() -> Result<PathBuf> {
        if let Ok(root) = std::env::var("RECIPEVAULT_ROOT") {
            return Ok(PathBuf::from(root));
        }
        let cwd = std::env::current_dir()?;
        if let Some(found) = find_upwards(&cwd, ".recipevault") {
            return Ok(found);
        }

        let data_dir = dirs::data_dir().ok_or_else(|| {
            crate::error::VaultError::MissingConfig("data directory not found".to_string())
        })?;
        Ok(data_dir.join("recipevault"))
    }
}

fn find_upwards(start: &Path, name: &str) -> Option<PathBuf> {
    let mut current = Some(start);
    while let Some(dir) = current {
        let candidate = dir.join(name);
        if candidate.is_dir() {
            return Some(candidate);
        }
        current = dir.parent();
    }
    None
}
