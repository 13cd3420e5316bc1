//! Keyed blob storage for recipe attachments.
//!
//! The store has two sides: binary image blobs and JSON executable
//! descriptors. "Not found" is a normal outcome, never an error — the
//! resolution chain treats it as a miss and falls through to the static
//! bundle.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::fs;

use crate::error::{Result, VaultError};

/// Editable attachment store capability.
#[async_trait]
pub trait FileStore: Send + Sync {
    async fn get_image(&self, key: &str) -> Result<Option<Vec<u8>>>;
    async fn store_image(&self, key: &str, bytes: &[u8]) -> Result<()>;
    async fn get_json_file(&self, key: &str) -> Result<Option<Vec<u8>>>;
    async fn store_json_file(&self, key: &str, bytes: &[u8]) -> Result<()>;
}

/// Filesystem-backed store: `<root>/images/<key>` and `<root>/json/<key>`.
pub struct FsFileStore {
    root: PathBuf,
}

impl FsFileStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        for side in ["images", "json"] {
            let dir = root.join(side);
            std::fs::create_dir_all(&dir).map_err(|err| {
                VaultError::Config(format!("create file store {}: {err}", dir.display()))
            })?;
        }
        Ok(Self { root })
    }

    fn side_path(&self, side: &str, key: &str) -> Result<PathBuf> {
        // Keys are flat identifiers; anything path-like is a caller bug or
        // hostile input.
        if key.is_empty() || key.contains('/') || key.contains('\\') || key.contains("..") {
            return Err(VaultError::Config(format!("invalid blob key: {key:?}")));
        }
        Ok(self.root.join(side).join(key))
    }

    async fn read(&self, side: &str, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.side_path(side, key)?;
        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(VaultError::Config(format!(
                "read blob {}: {err}",
                path.display()
            ))),
        }
    }

    async fn write(&self, side: &str, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.side_path(side, key)?;
        fs::write(&path, bytes).await.map_err(|err| {
            VaultError::Config(format!("write blob {}: {err}", path.display()))
        })
    }
}

#[async_trait]
impl FileStore for FsFileStore {
    async fn get_image(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.read("images", key).await
    }

    async fn store_image(&self, key: &str, bytes: &[u8]) -> Result<()> {
        self.write("images", key, bytes).await
    }

    async fn get_json_file(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.read("json", key).await
    }

    async fn store_json_file(&self, key: &str, bytes: &[u8]) -> Result<()> {
        self.write("json", key, bytes).await
    }
}

/// In-memory store for tests and embedded callers.
#[derive(Default)]
pub struct MemoryFileStore {
    images: Mutex<HashMap<String, Vec<u8>>>,
    json_files: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryFileStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn image_count(&self) -> usize {
        self.images.lock().len()
    }

    #[must_use]
    pub fn json_count(&self) -> usize {
        self.json_files.lock().len()
    }
}

#[async_trait]
impl FileStore for MemoryFileStore {
    async fn get_image(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.images.lock().get(key).cloned())
    }

    async fn store_image(&self, key: &str, bytes: &[u8]) -> Result<()> {
        self.images.lock().insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn get_json_file(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.json_files.lock().get(key).cloned())
    }

    async fn store_json_file(&self, key: &str, bytes: &[u8]) -> Result<()> {
        self.json_files
            .lock()
            .insert(key.to_string(), bytes.to_vec());
        Ok(())
    }
}
