//! Read-only access to the build-time asset bundle.
//!
//! The bundle ships attachments under `assets/recipes/<folderId>/<path>`;
//! the resolution chain falls back to it when the editable store misses.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::error::{Result, VaultError};

/// Static bundle capability: fetch bytes or report a miss.
#[async_trait]
pub trait StaticAssets: Send + Sync {
    async fn fetch(&self, folder_id: &str, relative_path: &str) -> Result<Option<Vec<u8>>>;
}

/// Filesystem bundle rooted at the `assets/recipes` tree.
pub struct FsStaticAssets {
    root: PathBuf,
}

impl FsStaticAssets {
    #[must_use]
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl StaticAssets for FsStaticAssets {
    async fn fetch(&self, folder_id: &str, relative_path: &str) -> Result<Option<Vec<u8>>> {
        let rel = Path::new(folder_id).join(relative_path);
        if rel
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(VaultError::Config(format!(
                "invalid asset path: {folder_id}/{relative_path}"
            )));
        }
        let path = self.root.join(rel);
        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(VaultError::Config(format!(
                "read asset {}: {err}",
                path.display()
            ))),
        }
    }
}

/// Bundle-less deployments: every fetch is a miss.
pub struct NoStaticAssets;

#[async_trait]
impl StaticAssets for NoStaticAssets {
    async fn fetch(&self, _folder_id: &str, _relative_path: &str) -> Result<Option<Vec<u8>>> {
        Ok(None)
    }
}
