//! Two-tier attachment resolution.
//!
//! Attachments live in the editable blob store first and fall back to the
//! static bundle shipped with the application. Sources are tried in
//! priority order; a miss or error in an earlier source is logged and
//! swallowed, never raised — a fully unresolved attachment is simply
//! omitted from the archive.

use tracing::debug;

use crate::config::FolderOverrides;
use crate::model::RecipeRecord;
use crate::store::{FileStore, StaticAssets};

/// Which side of the blob store an attachment resolves against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    Image,
    JsonFile,
}

/// Resolution sources in priority order.
#[derive(Debug, Clone, Copy)]
enum Source {
    BlobStore,
    StaticBundle,
}

const SOURCES: [Source; 2] = [Source::BlobStore, Source::StaticBundle];

pub struct ResolutionChain<'a> {
    store: &'a dyn FileStore,
    assets: &'a dyn StaticAssets,
    overrides: &'a FolderOverrides,
}

impl<'a> ResolutionChain<'a> {
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

    /// Resolve one attachment, first store hit wins.
    pub async fn resolve(
        &self,
        file_key: &str,
        record: &RecipeRecord,
        relative_path: &str,
        kind: AttachmentKind,
    ) -> Option<Vec<u8>> {
        for source in SOURCES {
            match self.try_source(source, file_key, record, relative_path, kind).await {
                Ok(Some(bytes)) => return Some(bytes),
                Ok(None) => {
                    debug!(record = %record.id, file_key, ?source, "attachment miss");
                }
                Err(err) => {
                    debug!(record = %record.id, file_key, ?source, %err, "attachment source failed");
                }
            }
        }
        None
    }

    async fn try_source(
        &self,
        source: Source,
        file_key: &str,
        record: &RecipeRecord,
        relative_path: &str,
        kind: AttachmentKind,
    ) -> crate::error::Result<Option<Vec<u8>>> {
        match source {
            Source::BlobStore => match kind {
                AttachmentKind::Image => self.store.get_image(file_key).await,
                AttachmentKind::JsonFile => self.store.get_json_file(file_key).await,
            },
            Source::StaticBundle => {
                let folder_id = self.overrides.effective_folder_id(&record.id);
                self.assets.fetch(folder_id, relative_path).await
            }
        }
    }
}
