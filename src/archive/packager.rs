//! Archive assembly.
//!
//! Records are processed strictly in input order, one attachment at a
//! time. Deterministic folder allocation and index ordering depend on the
//! sequential pass; do not parallelize the per-record loop.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::archive::layout::{
    ArchiveIndex, EXECUTABLES_DIR, IMAGES_DIR, INDEX_FILE, INSTRUCTIONS_FILE, RECIPE_FILE,
};
use crate::archive::progress::{ProgressFn, ProgressTracker};
use crate::config::FolderOverrides;
use crate::error::{Result, VaultError};
use crate::model::RecipeRecord;
use crate::naming::{allocate_folder_name, attachment_file_name, attachment_key};
use crate::resolve::{AttachmentKind, ResolutionChain};
use crate::store::{FileStore, StaticAssets};

const ZSTD_LEVEL: i32 = 3;

pub struct ArchivePackager<'a> {
    store: &'a dyn FileStore,
    assets: &'a dyn StaticAssets,
    overrides: &'a FolderOverrides,
}

impl<'a> ArchivePackager<'a> {
    #[must_use]
    pub fn new(
        store: &'a dyn FileStore,
        assets: &'a dyn StaticAssets,
        overrides: &'a FolderOverrides,
    ) -> Self {
        Self {
            store,
            assets,
            overrides,
        }
    }

    /// Pack `records` into a compressed archive byte stream.
    ///
    /// `catalog` is the wider record set the export was taken from; it only
    /// feeds the human-readable summary, never the index. Attachment
    /// resolution failures degrade the affected entry and are counted, not
    /// raised; any other error aborts with no partial output.
    pub async fn pack(
        &self,
        records: &[RecipeRecord],
        catalog: Option<&[RecipeRecord]>,
        progress: Option<&ProgressFn<'_>>,
    ) -> Result<Vec<u8>> {
        let mut tracker = ProgressTracker::new(records.len() + 2, progress);
        let chain = ResolutionChain::new(self.store, self.assets, self.overrides);

        let mut entries: Vec<(String, Vec<u8>)> = Vec::new();
        let mut used_folders: HashSet<String> = HashSet::new();
        let mut folders: Vec<String> = Vec::with_capacity(records.len());
        let mut missing_attachments = 0usize;

        for record in records {
            let folder = allocate_folder_name(&record.title, &used_folders);
            used_folders.insert(folder.clone());
            folders.push(folder.clone());

            let clean = record.interchange();
            let mut recipe_json = serde_json::to_vec_pretty(&clean)?;
            recipe_json.push(b'\n');
            entries.push((format!("{folder}/{RECIPE_FILE}"), recipe_json));

            let mut written: HashSet<String> = HashSet::new();
            for url in record.image_attachments() {
                let file_name = attachment_file_name(url);
                let entry_path = format!("{folder}/{IMAGES_DIR}/{file_name}");
                if !written.insert(entry_path.clone()) {
                    continue;
                }
                let key = attachment_key(file_name);
                match chain
                    .resolve(&key, record, url, AttachmentKind::Image)
                    .await
                {
                    Some(bytes) => entries.push((entry_path, bytes)),
                    None => {
                        missing_attachments += 1;
                        debug!(record = %record.id, url, "image attachment omitted");
                    }
                }
            }

            for exe in &record.download_executables {
                let file_name = attachment_file_name(&exe.file_path);
                let entry_path = format!("{folder}/{EXECUTABLES_DIR}/{file_name}");
                if !written.insert(entry_path.clone()) {
                    continue;
                }
                let key = attachment_key(file_name);
                match chain
                    .resolve(&key, record, &exe.file_path, AttachmentKind::JsonFile)
                    .await
                {
                    Some(bytes) => entries.push((entry_path, bytes)),
                    None => {
                        missing_attachments += 1;
                        debug!(record = %record.id, path = %exe.file_path, "executable omitted");
                    }
                }
            }

            tracker.tick(&format!("Packing {}", record.title));
        }

        // Index covers exactly the folders written above; the wider catalog
        // never leaks into it.
        let index = ArchiveIndex::from_folders(folders);
        let mut index_json = serde_json::to_vec_pretty(&index)?;
        index_json.push(b'\n');
        entries.push((INDEX_FILE.to_string(), index_json));

        let instructions = deployment_instructions(
            Utc::now(),
            &index,
            catalog.map_or(records.len(), <[RecipeRecord]>::len),
        );
        entries.push((INSTRUCTIONS_FILE.to_string(), instructions.into_bytes()));
        tracker.tick("Generating index");

        let archive = serialize_tree(&entries)?;
        tracker.tick("Compressing archive");

        info!(
            recipes = records.len(),
            missing_attachments,
            bytes = archive.len(),
            "archive packed"
        );
        Ok(archive)
    }
}

/// Human-readable redeployment note written at the archive root.
fn deployment_instructions(
    exported_at: DateTime<Utc>,
    index: &ArchiveIndex,
    catalog_total: usize,
) -> String {
    let mut text = String::new();
    text.push_str("RECIPE VAULT EXPORT\n");
    text.push_str("===================\n\n");
    text.push_str(&format!(
        "Exported: {}\n",
        exported_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    text.push_str(&format!(
        "Recipes:  {} of {} in the catalog\n\n",
        index.recipes.len(),
        catalog_total
    ));
    text.push_str("Contents\n--------\n");
    for entry in &index.recipes {
        text.push_str(&format!("  {}/\n", entry.folder_id));
    }
    text.push_str(
        "\nEach folder holds recipe.json plus its images/ and \
         downloadExecutables/ attachments.\n\n\
         To redeploy\n-----------\n\
         1. Import this archive on the target system (recipevault import).\n\
         2. Accepted recipes are validated and their attachments restored\n   \
         into the local store automatically.\n\
         3. Folders marked inactive in index.json are skipped on import.\n",
    );
    text
}

/// Serialize the in-memory tree as a zstd-compressed tar stream.
///
/// Headers are normalized (mode 0644, zero mtime) so identical trees
/// produce identical bytes.
fn serialize_tree(entries: &[(String, Vec<u8>)]) -> Result<Vec<u8>> {
    let mut encoder = zstd::Encoder::new(Vec::new(), ZSTD_LEVEL)
        .map_err(|e| VaultError::Compression(format!("zstd encode: {e}")))?;
    {
        let mut builder = tar::Builder::new(&mut encoder);
        for (path, data) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_mtime(0);
            builder
                .append_data(&mut header, path, data.as_slice())
                .map_err(|e| VaultError::Archive(format!("append {path}: {e}")))?;
        }
        builder
            .finish()
            .map_err(|e| VaultError::Archive(format!("finalize tar: {e}")))?;
    }
    encoder
        .finish()
        .map_err(|e| VaultError::Compression(format!("zstd finish: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryFileStore, NoStaticAssets};
    use std::sync::Mutex;

    fn record(id: &str, title: &str) -> RecipeRecord {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "title": title,
            "category": "Batch",
        }))
        .unwrap()
    }

    fn read_entries(archive: &[u8]) -> Vec<String> {
        let decoder = zstd::Decoder::new(archive).unwrap();
        let mut tar = tar::Archive::new(decoder);
        tar.entries()
            .unwrap()
            .map(|e| e.unwrap().path().unwrap().to_string_lossy().to_string())
            .collect()
    }

    #[tokio::test]
    async fn packs_folders_index_and_instructions() {
        let store = MemoryFileStore::new();
        let overrides = FolderOverrides::default();
        let packager = ArchivePackager::new(&store, &NoStaticAssets, &overrides);

        let records = vec![record("r-1", "Daily Report"), record("r-2", "Daily Report")];
        let archive = packager.pack(&records, None, None).await.unwrap();

        let paths = read_entries(&archive);
        assert!(paths.contains(&"daily-report/recipe.json".to_string()));
        assert!(paths.contains(&"daily-report-2/recipe.json".to_string()));
        assert!(paths.contains(&"index.json".to_string()));
        assert!(paths.contains(&"DEPLOYMENT_INSTRUCTIONS.txt".to_string()));
    }

    #[tokio::test]
    async fn missing_attachment_degrades_single_entry_only() {
        let store = MemoryFileStore::new();
        store.store_image("img_1_a", b"present").await.unwrap();
        let overrides = FolderOverrides::default();
        let packager = ArchivePackager::new(&store, &NoStaticAssets, &overrides);

        let mut rec = record("r-1", "With Media");
        rec.walkthrough = vec![serde_json::from_value(serde_json::json!({
            "step": "Shots",
            "config": [],
            "media": [
                { "type": "image", "url": "images/img_1_a_ok.png" },
                { "type": "image", "url": "images/img_9_z_gone.png" },
            ],
        }))
        .unwrap()];

        let archive = packager.pack(&[rec], None, None).await.unwrap();
        let paths = read_entries(&archive);
        assert!(paths.contains(&"with-media/images/img_1_a_ok.png".to_string()));
        assert!(!paths.iter().any(|p| p.contains("gone")));
        assert!(paths.contains(&"with-media/recipe.json".to_string()));
    }

    #[tokio::test]
    async fn progress_ticks_per_record_plus_index_and_serialize() {
        let store = MemoryFileStore::new();
        let overrides = FolderOverrides::default();
        let packager = ArchivePackager::new(&store, &NoStaticAssets, &overrides);

        let seen: Mutex<Vec<(usize, usize)>> = Mutex::new(Vec::new());
        let callback =
            |p: crate::archive::ExportProgress| seen.lock().unwrap().push((p.current, p.total));
        let records = vec![record("r-1", "One"), record("r-2", "Two")];
        packager
            .pack(&records, None, Some(&callback))
            .await
            .unwrap();

        drop(callback);
        let seen = seen.into_inner().unwrap();
        assert_eq!(seen, vec![(1, 4), (2, 4), (3, 4), (4, 4)]);
    }

    #[tokio::test]
    async fn index_counts_exported_set_not_catalog() {
        let store = MemoryFileStore::new();
        let overrides = FolderOverrides::default();
        let packager = ArchivePackager::new(&store, &NoStaticAssets, &overrides);

        let catalog = vec![
            record("r-1", "One"),
            record("r-2", "Two"),
            record("r-3", "Three"),
        ];
        let exported = &catalog[..2];
        let archive = packager
            .pack(exported, Some(catalog.as_slice()), None)
            .await
            .unwrap();

        let decoder = zstd::Decoder::new(archive.as_slice()).unwrap();
        let mut tar = tar::Archive::new(decoder);
        let mut index_bytes = Vec::new();
        for entry in tar.entries().unwrap() {
            let mut entry = entry.unwrap();
            if entry.path().unwrap().to_string_lossy() == "index.json" {
                std::io::Read::read_to_end(&mut entry, &mut index_bytes).unwrap();
            }
        }
        let index: ArchiveIndex = serde_json::from_slice(&index_bytes).unwrap();
        assert_eq!(index.recipes.len(), 2);
    }
}
