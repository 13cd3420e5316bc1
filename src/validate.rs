//! Structural validation of untrusted recipe payloads.
//!
//! A candidate either fully validates into a typed [`RecipeRecord`] or is
//! rejected outright; there is no field-level partial acceptance. Known
//! collection fields are backfilled with empty arrays *in place* — callers
//! rely on post-validation candidates being fully populated.

use serde_json::Value;
use tracing::warn;

use crate::error::{Result, VaultError};
use crate::model::{Category, RecipeRecord};

/// Collection fields that must always be present on a validated record.
const COLLECTION_FIELDS: [&str; 6] = [
    "versions",
    "prerequisites",
    "walkthrough",
    "downloadExecutables",
    "relatedRecipes",
    "keywords",
];

/// Validate and normalize one untrusted candidate.
///
/// On success the candidate has every known collection field present as an
/// array and deserializes into the returned record. On failure the error
/// names the offending field and a warning is logged.
pub fn validate_record(candidate: &mut Value) -> Result<RecipeRecord> {
    let Some(obj) = candidate.as_object_mut() else {
        return Err(reject("record", "not a JSON object"));
    };

    match obj.get("title").and_then(Value::as_str) {
        Some(title) if !title.trim().is_empty() => {}
        _ => return Err(reject("title", "missing or empty")),
    }

    match obj.get("category").and_then(Value::as_str) {
        Some(label) if Category::from_label(label).is_some() => {}
        Some(label) => {
            return Err(reject(
                "category",
                &format!("\"{label}\" is not a known category"),
            ));
        }
        None => return Err(reject("category", "missing or empty")),
    }

    for field in COLLECTION_FIELDS {
        match obj.get(field) {
            None => {
                obj.insert(field.to_string(), Value::Array(Vec::new()));
            }
            Some(Value::Array(_)) => {}
            Some(_) => return Err(reject(field, "present but not a sequence")),
        }
    }

    if let Some(steps) = obj.get("walkthrough").and_then(Value::as_array) {
        for (i, step) in steps.iter().enumerate() {
            validate_step(i, step)?;
        }
    }

    serde_json::from_value(candidate.clone())
        .map_err(|err| reject("record", &format!("deserialize: {err}")))
}

fn validate_step(index: usize, step: &Value) -> Result<()> {
    let label = step.get("step").and_then(Value::as_str).unwrap_or_default();
    if label.trim().is_empty() {
        return Err(reject(
            &format!("walkthrough[{index}].step"),
            "missing or empty",
        ));
    }
    for field in ["config", "media"] {
        if !step.get(field).is_some_and(Value::is_array) {
            return Err(reject(
                &format!("walkthrough[{index}].{field}"),
                "missing or not a sequence",
            ));
        }
    }
    Ok(())
}

fn reject(field: &str, reason: &str) -> VaultError {
    warn!(field, reason, "rejecting recipe record");
    VaultError::ValidationFailed(format!("{field}: {reason}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn minimal_batch_record_accepted_with_defaults() {
        let mut candidate = json!({
            "id": "r-1",
            "title": "Nightly ledger sync",
            "category": "Batch",
        });
        let record = validate_record(&mut candidate).unwrap();
        assert_eq!(record.category, Category::Batch);
        assert!(record.walkthrough.is_empty());

        // Side effect: the candidate itself now carries every collection.
        for field in COLLECTION_FIELDS {
            assert_eq!(candidate[field], json!([]), "{field} not backfilled");
        }
    }

    #[test]
    fn missing_category_rejected() {
        let mut candidate = json!({ "id": "r-1", "title": "t" });
        assert!(validate_record(&mut candidate).is_err());
    }

    #[test]
    fn unknown_category_rejected() {
        let mut candidate = json!({ "id": "r-1", "title": "t", "category": "Unknown" });
        let err = validate_record(&mut candidate).unwrap_err();
        assert!(err.to_string().contains("category"));
    }

    #[test]
    fn empty_title_rejected() {
        let mut candidate = json!({ "id": "r-1", "title": "  ", "category": "Batch" });
        let err = validate_record(&mut candidate).unwrap_err();
        assert!(err.to_string().contains("title"));
    }

    #[test]
    fn non_sequence_collection_rejected() {
        let mut candidate = json!({
            "id": "r-1",
            "title": "t",
            "category": "Batch",
            "keywords": "not-a-list",
        });
        let err = validate_record(&mut candidate).unwrap_err();
        assert!(err.to_string().contains("keywords"));
    }

    #[test]
    fn step_missing_media_rejects_whole_record() {
        let mut candidate = json!({
            "id": "r-1",
            "title": "t",
            "category": "Batch",
            "walkthrough": [
                { "step": "Install", "config": [], "media": [] },
                { "step": "Configure", "config": [] },
            ],
        });
        let err = validate_record(&mut candidate).unwrap_err();
        assert!(err.to_string().contains("walkthrough[1].media"));
    }

    #[test]
    fn step_with_empty_label_rejected() {
        let mut candidate = json!({
            "id": "r-1",
            "title": "t",
            "category": "Batch",
            "walkthrough": [{ "step": "", "config": [], "media": [] }],
        });
        assert!(validate_record(&mut candidate).is_err());
    }
}
