//! Direct-download JSON export and multi-shape import payloads.
//!
//! Besides the folder-tree archive, the catalog can be exported as a single
//! structured JSON document. Import accepts three payload shapes with fixed
//! precedence: the structured document (only when `metadata`, `recipes`,
//! and `index` are all present), a bare record array, or a single record
//! object.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use tracing::warn;

use crate::archive::layout::ArchiveIndex;
use crate::archive::unpacker::{ImportOutcome, ImportSkip};
use crate::error::{Result, VaultError};
use crate::model::RecipeRecord;
use crate::naming::allocate_folder_name;
use crate::validate::validate_record;

/// Format tag stamped into direct export metadata.
pub const DIRECT_FORMAT: &str = "recipevault-direct";
/// Document schema version.
pub const DIRECT_VERSION: &str = "1.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMetadata {
    pub export_date: DateTime<Utc>,
    pub version: String,
    pub recipe_count: usize,
    pub format: String,
}

/// The structured direct-download document.
#[derive(Debug, Serialize, Deserialize)]
pub struct DirectExport {
    pub metadata: ExportMetadata,
    pub index: ArchiveIndex,
    pub recipes: Vec<RecipeRecord>,
}

/// Build the direct export document for a record set.
///
/// Folder ids in the embedded index are allocated exactly as the archive
/// packager would allocate them, so the two export paths agree.
#[must_use]
pub fn build_direct_export(records: &[RecipeRecord]) -> DirectExport {
    let mut used = HashSet::new();
    let mut folders = Vec::with_capacity(records.len());
    for record in records {
        let folder = allocate_folder_name(&record.title, &used);
        used.insert(folder.clone());
        folders.push(folder);
    }

    DirectExport {
        metadata: ExportMetadata {
            export_date: Utc::now(),
            version: DIRECT_VERSION.to_string(),
            recipe_count: records.len(),
            format: DIRECT_FORMAT.to_string(),
        },
        index: ArchiveIndex::from_folders(folders),
        recipes: records.iter().map(RecipeRecord::interchange).collect(),
    }
}

/// Normalize an import payload to a flat candidate list.
///
/// Precedence is deliberate and preserved from the original contract: a
/// document missing any of the three structured keys falls through to
/// array, then single-object detection.
pub fn normalize_import_payload(payload: &Value) -> Result<Vec<Value>> {
    if let Some(obj) = payload.as_object() {
        if obj.contains_key("metadata") && obj.contains_key("recipes") && obj.contains_key("index")
        {
            return payload
                .get("recipes")
                .and_then(Value::as_array)
                .cloned()
                .ok_or_else(|| {
                    VaultError::ValidationFailed(
                        "structured document recipes field is not a sequence".to_string(),
                    )
                });
        }
    }

    if let Some(items) = payload.as_array() {
        return Ok(items.clone());
    }

    if payload.is_object() {
        return Ok(vec![payload.clone()]);
    }

    Err(VaultError::ValidationFailed(
        "unrecognized import payload shape".to_string(),
    ))
}

/// Import a direct JSON payload: normalize, then validate each candidate.
///
/// Mirrors the archive unpacker's acceptance semantics — invalid candidates
/// are skipped with a warning, an empty accepted list is an error.
pub fn import_direct_payload(payload: &Value) -> Result<ImportOutcome> {
    let candidates = normalize_import_payload(payload)?;

    let mut records = Vec::new();
    let mut skipped = Vec::new();
    for (i, mut candidate) in candidates.into_iter().enumerate() {
        match validate_record(&mut candidate) {
            Ok(record) => records.push(record),
            Err(err) => {
                warn!(index = i, %err, "invalid recipe in direct payload, skipping");
                skipped.push(ImportSkip {
                    folder: format!("recipe #{}", i + 1),
                    reason: err.to_string(),
                });
            }
        }
    }

    if records.is_empty() {
        return Err(VaultError::NoValidRecipes);
    }
    Ok(ImportOutcome {
        records,
        skipped,
        restored_attachments: 0,
    })
}
