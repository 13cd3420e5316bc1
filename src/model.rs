//! Portable recipe documents and their companion types.
//!
//! Everything here crosses the archive boundary, so field names follow the
//! catalog's camelCase interchange contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Closed set of catalog categories.
///
/// The gate is the type itself: a payload whose `category` is not one of
/// these five labels fails deserialization and is rejected by the
/// validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Batch,
    Interactive,
    Integration,
    Reporting,
    Utility,
}

impl Category {
    /// All category labels, in display order.
    #[must_use]
    pub fn all() -> &'static [Self] {
        &[
            Self::Batch,
            Self::Interactive,
            Self::Integration,
            Self::Reporting,
            Self::Utility,
        ]
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Batch => "Batch",
            Self::Interactive => "Interactive",
            Self::Integration => "Integration",
            Self::Reporting => "Reporting",
            Self::Utility => "Utility",
        }
    }

    /// Look a label up against the closed set.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::all().iter().copied().find(|c| c.as_str() == label)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of a walkthrough media entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
    Link,
    Document,
}

/// One media entry attached to a walkthrough step.
///
/// URLs beginning with `images/` are attachment references resolved through
/// the resolution chain; every other URL passes through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub url: String,
}

impl MediaItem {
    /// True when the URL points into the private attachment namespace.
    #[must_use]
    pub fn is_attachment(&self) -> bool {
        self.media_type == MediaType::Image && self.url.starts_with("images/")
    }
}

/// One step of a recipe walkthrough.
///
/// Invariant (enforced by the validator, relied on everywhere else): `step`
/// is non-empty and both `config` and `media` are present, possibly empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalkthroughStep {
    pub step: String,
    pub config: Vec<serde_json::Value>,
    pub media: Vec<MediaItem>,
}

/// A downloadable executable shipped with a recipe.
///
/// `file_path` lives under the private `downloadExecutables/` namespace and
/// is resolved against the JSON-file side of the blob store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutableDescriptor {
    pub name: String,
    pub file_path: String,
}

/// A general (non-step) image attached to a recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

/// The portable unit of the catalog.
///
/// Collection fields are always present after validation; the validator
/// backfills any that are absent on untrusted input. `updated_at` and
/// `user_added` are local bookkeeping and never cross the archive boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeRecord {
    pub id: String,
    pub title: String,
    pub category: Category,
    #[serde(default)]
    pub versions: Vec<String>,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    #[serde(default)]
    pub walkthrough: Vec<WalkthroughStep>,
    #[serde(default)]
    pub download_executables: Vec<ExecutableDescriptor>,
    #[serde(default)]
    pub related_recipes: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<ImageRef>>,

    // Local bookkeeping, stripped before export.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub user_added: bool,
}

impl RecipeRecord {
    /// Copy of the record with local bookkeeping fields cleared, suitable
    /// for writing into an archive or direct export document.
    #[must_use]
    pub fn interchange(&self) -> Self {
        Self {
            updated_at: None,
            user_added: false,
            ..self.clone()
        }
    }

    /// Every attachment-namespace image URL on this record, walkthrough
    /// media first, then general images, in document order.
    #[must_use]
    pub fn image_attachments(&self) -> Vec<&str> {
        let mut urls: Vec<&str> = self
            .walkthrough
            .iter()
            .flat_map(|s| s.media.iter())
            .filter(|m| m.is_attachment())
            .map(|m| m.url.as_str())
            .collect();
        if let Some(images) = &self.images {
            urls.extend(
                images
                    .iter()
                    .filter(|i| i.url.starts_with("images/"))
                    .map(|i| i.url.as_str()),
            );
        }
        urls
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_record() -> RecipeRecord {
        serde_json::from_value(serde_json::json!({
            "id": "r-1",
            "title": "Nightly ledger sync",
            "category": "Batch",
        }))
        .unwrap()
    }

    #[test]
    fn category_labels_round_trip() {
        for cat in Category::all() {
            assert_eq!(Category::from_label(cat.as_str()), Some(*cat));
        }
        assert_eq!(Category::from_label("Unknown"), None);
    }

    #[test]
    fn collections_default_to_empty_on_deserialize() {
        let record = minimal_record();
        assert!(record.versions.is_empty());
        assert!(record.walkthrough.is_empty());
        assert!(record.download_executables.is_empty());
        assert!(record.images.is_none());
    }

    #[test]
    fn interchange_strips_local_bookkeeping() {
        let mut record = minimal_record();
        record.updated_at = Some(Utc::now());
        record.user_added = true;

        let clean = record.interchange();
        let json = serde_json::to_value(&clean).unwrap();
        assert!(json.get("updatedAt").is_none());
        assert!(json.get("userAdded").is_none());
        assert_eq!(json["category"], "Batch");
        assert_eq!(json["downloadExecutables"], serde_json::json!([]));
    }

    #[test]
    fn image_attachments_skip_passthrough_urls() {
        let mut record = minimal_record();
        record.walkthrough = vec![WalkthroughStep {
            step: "Install the runner".to_string(),
            config: vec![],
            media: vec![
                MediaItem {
                    media_type: MediaType::Image,
                    url: "images/img_1_a_setup.png".to_string(),
                },
                MediaItem {
                    media_type: MediaType::Video,
                    url: "https://example.com/clip.mp4".to_string(),
                },
                MediaItem {
                    media_type: MediaType::Image,
                    url: "https://cdn.example.com/external.png".to_string(),
                },
            ],
        }];
        record.images = Some(vec![ImageRef {
            url: "images/img_2_b_overview.png".to_string(),
            caption: None,
        }]);

        assert_eq!(
            record.image_attachments(),
            vec!["images/img_1_a_setup.png", "images/img_2_b_overview.png"]
        );
    }
}
