//! Archive entry layout and the per-archive index document.

use serde::{Deserialize, Serialize};

/// Root manifest listing exported folders.
pub const INDEX_FILE: &str = "index.json";
/// Human-readable export summary; written on export, never parsed on import.
pub const INSTRUCTIONS_FILE: &str = "DEPLOYMENT_INSTRUCTIONS.txt";
/// Per-folder record document.
pub const RECIPE_FILE: &str = "recipe.json";
/// Per-folder image attachment directory.
pub const IMAGES_DIR: &str = "images";
/// Per-folder executable descriptor directory.
pub const EXECUTABLES_DIR: &str = "downloadExecutables";

/// Platform junk folders ignored while enumerating an incoming archive.
pub const METADATA_FOLDERS: [&str; 1] = ["__MACOSX"];

/// One exported recipe folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveIndexEntry {
    pub folder_id: String,
    pub active: bool,
}

/// The `index.json` document.
///
/// Regenerated from the exported set on every export — never carried over
/// from a previous index. Entries are sorted by folder id so two exports of
/// the same record set match byte for byte.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveIndex {
    #[serde(default)]
    pub recipes: Vec<ArchiveIndexEntry>,
}

impl ArchiveIndex {
    /// Build a sorted index over the folders written by one export run.
    #[must_use]
    pub fn from_folders<I, S>(folders: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut recipes: Vec<ArchiveIndexEntry> = folders
            .into_iter()
            .map(|folder_id| ArchiveIndexEntry {
                folder_id: folder_id.into(),
                active: true,
            })
            .collect();
        recipes.sort_by(|a, b| a.folder_id.cmp(&b.folder_id));
        Self { recipes }
    }

    /// Whether a folder should be imported. Folders without an index entry
    /// are treated as active.
    #[must_use]
    pub fn is_active(&self, folder_id: &str) -> bool {
        self.recipes
            .iter()
            .find(|e| e.folder_id == folder_id)
            .is_none_or(|e| e.active)
    }
}
