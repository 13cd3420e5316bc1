//! Archive ingestion.
//!
//! The whole archive is decompressed into memory first, then interpreted
//! folder by folder. Per-folder problems (missing or invalid recipe.json)
//! skip that folder only; an unreadable archive is the one fatal case.

use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::archive::layout::{
    ArchiveIndex, EXECUTABLES_DIR, IMAGES_DIR, INDEX_FILE, METADATA_FOLDERS, RECIPE_FILE,
};
use crate::archive::progress::{ProgressFn, ProgressTracker};
use crate::error::{Result, VaultError};
use crate::model::RecipeRecord;
use crate::naming::{attachment_file_name, attachment_key};
use crate::store::FileStore;
use crate::validate::validate_record;

/// One folder that did not make it into the accepted list.
#[derive(Debug, Clone)]
pub struct ImportSkip {
    pub folder: String,
    pub reason: String,
}

/// Result of one unpack run.
///
/// A partial result (some folders skipped) is a success; callers surface
/// the skip list as a single aggregate warning.
#[derive(Debug)]
pub struct ImportOutcome {
    pub records: Vec<RecipeRecord>,
    pub skipped: Vec<ImportSkip>,
    pub restored_attachments: usize,
}

pub struct ArchiveUnpacker<'a> {
    store: &'a dyn FileStore,
}

impl<'a> ArchiveUnpacker<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn FileStore) -> Self {
        Self { store }
    }

    /// Unpack an archive byte stream, restoring attachments into the store.
    pub async fn unpack(
        &self,
        archive: &[u8],
        progress: Option<&ProgressFn<'_>>,
    ) -> Result<ImportOutcome> {
        let files = extract_all_files(archive)?;

        let index = files.get(INDEX_FILE).and_then(|bytes| {
            match serde_json::from_slice::<ArchiveIndex>(bytes) {
                Ok(index) => Some(index),
                Err(err) => {
                    warn!(%err, "archive index unreadable, importing all folders");
                    None
                }
            }
        });

        let folders: BTreeSet<&str> = files
            .keys()
            .filter_map(|path| path.split_once('/').map(|(folder, _)| folder))
            .filter(|folder| !METADATA_FOLDERS.contains(folder))
            .collect();

        let mut tracker = ProgressTracker::new(folders.len(), progress);
        let mut records = Vec::new();
        let mut skipped = Vec::new();
        let mut restored_attachments = 0usize;

        for folder in folders {
            tracker.tick(&format!("Importing {folder}"));

            let Some(recipe_bytes) = files.get(&format!("{folder}/{RECIPE_FILE}")) else {
                warn!(folder, "folder has no recipe.json, skipping");
                skipped.push(ImportSkip {
                    folder: folder.to_string(),
                    reason: "missing recipe.json".to_string(),
                });
                continue;
            };

            let mut candidate: Value = match serde_json::from_slice(recipe_bytes) {
                Ok(value) => value,
                Err(err) => {
                    warn!(folder, %err, "recipe.json unparseable, skipping");
                    skipped.push(ImportSkip {
                        folder: folder.to_string(),
                        reason: format!("unparseable recipe.json: {err}"),
                    });
                    continue;
                }
            };

            let record = match validate_record(&mut candidate) {
                Ok(record) => record,
                Err(err) => {
                    warn!(folder, %err, "invalid recipe record, skipping");
                    skipped.push(ImportSkip {
                        folder: folder.to_string(),
                        reason: err.to_string(),
                    });
                    continue;
                }
            };

            if let Some(index) = &index {
                if !index.is_active(folder) {
                    debug!(folder, "folder marked inactive in index, skipping");
                    skipped.push(ImportSkip {
                        folder: folder.to_string(),
                        reason: "marked inactive in index".to_string(),
                    });
                    continue;
                }
            }

            restored_attachments += self.restore_attachments(folder, &files).await?;
            records.push(record);
        }

        if records.is_empty() {
            return Err(VaultError::NoValidRecipes);
        }

        info!(
            accepted = records.len(),
            skipped = skipped.len(),
            restored_attachments,
            "archive unpacked"
        );
        Ok(ImportOutcome {
            records,
            skipped,
            restored_attachments,
        })
    }

    async fn restore_attachments(
        &self,
        folder: &str,
        files: &BTreeMap<String, Vec<u8>>,
    ) -> Result<usize> {
        let image_prefix = format!("{folder}/{IMAGES_DIR}/");
        let exe_prefix = format!("{folder}/{EXECUTABLES_DIR}/");
        let mut restored = 0usize;

        for (path, bytes) in files {
            if let Some(rest) = path.strip_prefix(&image_prefix) {
                let file_name = attachment_file_name(rest);
                if file_name.is_empty() {
                    continue;
                }
                self.store
                    .store_image(&attachment_key(file_name), bytes)
                    .await?;
                restored += 1;
            } else if let Some(rest) = path.strip_prefix(&exe_prefix) {
                let file_name = attachment_file_name(rest);
                if !file_name.ends_with(".json") {
                    continue;
                }
                self.store.store_json_file(file_name, bytes).await?;
                restored += 1;
            }
        }

        Ok(restored)
    }
}

/// Decompress and untar the whole archive into a path→bytes map.
fn extract_all_files(archive: &[u8]) -> Result<BTreeMap<String, Vec<u8>>> {
    let decoder = zstd::Decoder::new(archive)
        .map_err(|e| VaultError::Compression(format!("zstd decode: {e}")))?;
    let mut tar = tar::Archive::new(decoder);
    let mut files = BTreeMap::new();

    for entry in tar
        .entries()
        .map_err(|e| VaultError::Archive(e.to_string()))?
    {
        let mut entry = entry.map_err(|e| VaultError::Archive(e.to_string()))?;
        if !entry.header().entry_type().is_file() {
            continue;
        }
        let path = entry
            .path()
            .map_err(|e| VaultError::Archive(e.to_string()))?
            .to_string_lossy()
            .trim_start_matches("./")
            .to_string();
        if path.is_empty() {
            continue;
        }
        let mut data = Vec::new();
        entry
            .read_to_end(&mut data)
            .map_err(|e| VaultError::Archive(format!("read {path}: {e}")))?;
        files.insert(path, data);
    }

    Ok(files)
}
