//! Deterministic archive naming.
//!
//! Folder names are derived from recipe titles once per export; the same
//! mapping feeds both the physical folders and the index so the two can
//! never disagree. Attachment file names encode a `prefix_timestamp_random`
//! identifier used as the blob-store key.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// Fallback folder name for titles that slug down to nothing.
pub const UNNAMED_FOLDER: &str = "unnamed-recipe";

const MAX_FOLDER_LEN: usize = 50;

static FS_ILLEGAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[<>:"/\\|?*]"#).expect("static pattern"));
static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s-]").expect("static pattern"));
static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("static pattern"));
static HYPHEN_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-{2,}").expect("static pattern"));

/// Slug a title down to a filesystem-safe folder base name.
#[must_use]
pub fn folder_base_name(title: &str) -> String {
    let lowered = title.to_lowercase();
    let cleaned = FS_ILLEGAL.replace_all(&lowered, "");
    let cleaned = NON_WORD.replace_all(&cleaned, "");
    let cleaned = WHITESPACE_RUN.replace_all(cleaned.trim(), "-");
    let cleaned = HYPHEN_RUN.replace_all(&cleaned, "-");
    let trimmed = cleaned.trim_matches('-');
    let truncated: String = trimmed.chars().take(MAX_FOLDER_LEN).collect();
    if truncated.is_empty() {
        UNNAMED_FOLDER.to_string()
    } else {
        truncated
    }
}

/// Allocate a collision-free folder name for `title`.
///
/// Pure apart from reading `used`; the caller records the returned name in
/// `used` to keep the allocation pass deterministic in input order.
#[must_use]
pub fn allocate_folder_name(title: &str, used: &HashSet<String>) -> String {
    let base = folder_base_name(title);
    if !used.contains(&base) {
        return base;
    }
    let mut suffix = 2u32;
    loop {
        let candidate = format!("{base}-{suffix}");
        if !used.contains(&candidate) {
            return candidate;
        }
        suffix += 1;
    }
}

/// Extract the blob-store key from an attachment file name.
///
/// Keys are the first three `_`-delimited segments; a name with fewer
/// segments is its own key.
#[must_use]
pub fn attachment_key(file_name: &str) -> String {
    let parts: Vec<&str> = file_name.split('_').collect();
    if parts.len() >= 3 {
        parts[..3].join("_")
    } else {
        file_name.to_string()
    }
}

/// File-name component of an attachment URL or path.
#[must_use]
pub fn attachment_file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_collapse_punctuation_and_whitespace() {
        assert_eq!(
            folder_base_name("  Nightly   Ledger -- Sync! "),
            "nightly-ledger-sync"
        );
        assert_eq!(folder_base_name("A/B: \"pipe|test\"?"), "abpipetest");
    }

    #[test]
    fn empty_slug_falls_back() {
        assert_eq!(folder_base_name("!!!"), UNNAMED_FOLDER);
        assert_eq!(folder_base_name("   "), UNNAMED_FOLDER);
    }

    #[test]
    fn long_titles_truncate() {
        let long = "x".repeat(80);
        assert_eq!(folder_base_name(&long).len(), 50);
    }

    #[test]
    fn duplicates_get_numeric_suffixes_in_order() {
        let mut used = HashSet::new();
        let mut names = Vec::new();
        for _ in 0..3 {
            let name = allocate_folder_name("Daily Report", &used);
            used.insert(name.clone());
            names.push(name);
        }
        assert_eq!(names, vec!["daily-report", "daily-report-2", "daily-report-3"]);
    }

    #[test]
    fn key_extraction_takes_three_segments() {
        assert_eq!(
            attachment_key("img_1690000000_ab12_myphoto.png"),
            "img_1690000000_ab12"
        );
        assert_eq!(attachment_key("logo.png"), "logo.png");
        assert_eq!(attachment_key("a_b.png"), "a_b.png");
    }

    #[test]
    fn file_name_component() {
        assert_eq!(
            attachment_file_name("images/img_1_2_shot.png"),
            "img_1_2_shot.png"
        );
        assert_eq!(attachment_file_name("plain.png"), "plain.png");
    }
}
