//! End-to-end pack/unpack coverage over in-memory stores.

use recipevault::archive::{ArchivePackager, ArchiveUnpacker};
use recipevault::config::FolderOverrides;
use recipevault::model::RecipeRecord;
use recipevault::store::{FileStore, MemoryFileStore, NoStaticAssets};

fn record(value: serde_json::Value) -> RecipeRecord {
    serde_json::from_value(value).unwrap()
}

fn sample_record() -> RecipeRecord {
    record(serde_json::json!({
        "id": "recipe-42",
        "title": "Quarterly Close Automation",
        "category": "Batch",
        "versions": ["2024.1"],
        "prerequisites": ["Ledger access"],
        "keywords": ["finance", "close"],
        "walkthrough": [{
            "step": "Install the runner",
            "config": [{ "key": "threads", "value": 4 }],
            "media": [
                { "type": "image", "url": "images/img_1690000000_ab12_setup.png" },
                { "type": "link", "url": "https://example.com/docs" },
            ],
        }],
        "downloadExecutables": [{
            "name": "Close runner",
            "filePath": "downloadExecutables/close_runner.json",
        }],
    }))
}

#[tokio::test]
async fn round_trip_preserves_core_fields_and_attachments() {
    let source_store = MemoryFileStore::new();
    source_store
        .store_image("img_1690000000_ab12", b"png-bytes")
        .await
        .unwrap();
    source_store
        .store_json_file("close_runner.json", b"{\"cmd\":\"close\"}")
        .await
        .unwrap();

    let overrides = FolderOverrides::default();
    let packager = ArchivePackager::new(&source_store, &NoStaticAssets, &overrides);
    let original = sample_record();
    let archive = packager
        .pack(std::slice::from_ref(&original), None, None)
        .await
        .unwrap();

    let target_store = MemoryFileStore::new();
    let outcome = ArchiveUnpacker::new(&target_store)
        .unpack(&archive, None)
        .await
        .unwrap();

    assert_eq!(outcome.records.len(), 1);
    let restored = &outcome.records[0];
    assert_eq!(restored.id, original.id);
    assert_eq!(restored.title, original.title);
    assert_eq!(restored.category, original.category);
    assert_eq!(restored.keywords, original.keywords);
    assert_eq!(restored.walkthrough.len(), 1);

    // Attachments land back in the target store under their extracted keys.
    assert!(
        target_store
            .get_image("img_1690000000_ab12")
            .await
            .unwrap()
            .is_some()
    );
    assert!(
        target_store
            .get_json_file("close_runner.json")
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
async fn round_trip_surfaces_defaulted_collections() {
    let store = MemoryFileStore::new();
    let overrides = FolderOverrides::default();
    let packager = ArchivePackager::new(&store, &NoStaticAssets, &overrides);

    let minimal = record(serde_json::json!({
        "id": "r-min",
        "title": "Bare Minimum",
        "category": "Utility",
    }));
    let archive = packager.pack(&[minimal], None, None).await.unwrap();

    let outcome = ArchiveUnpacker::new(&store).unpack(&archive, None).await.unwrap();
    let restored = &outcome.records[0];
    assert!(restored.versions.is_empty());
    assert!(restored.prerequisites.is_empty());
    assert!(restored.walkthrough.is_empty());
    assert!(restored.download_executables.is_empty());
    assert!(restored.related_recipes.is_empty());
    assert!(restored.keywords.is_empty());
}

#[tokio::test]
async fn duplicate_titles_round_trip_as_distinct_folders() {
    let store = MemoryFileStore::new();
    let overrides = FolderOverrides::default();
    let packager = ArchivePackager::new(&store, &NoStaticAssets, &overrides);

    let records = vec![
        record(serde_json::json!({ "id": "r-1", "title": "Same Name", "category": "Batch" })),
        record(serde_json::json!({ "id": "r-2", "title": "Same Name", "category": "Batch" })),
        record(serde_json::json!({ "id": "r-3", "title": "Same Name", "category": "Batch" })),
    ];
    let archive = packager.pack(&records, None, None).await.unwrap();

    let outcome = ArchiveUnpacker::new(&store).unpack(&archive, None).await.unwrap();
    assert_eq!(outcome.records.len(), 3);

    let mut ids: Vec<&str> = outcome.records.iter().map(|r| r.id.as_str()).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec!["r-1", "r-2", "r-3"]);
}

#[tokio::test]
async fn identical_exports_are_byte_identical() {
    let store = MemoryFileStore::new();
    let overrides = FolderOverrides::default();
    let packager = ArchivePackager::new(&store, &NoStaticAssets, &overrides);

    let records = vec![
        record(serde_json::json!({ "id": "r-1", "title": "Zeta", "category": "Batch" })),
        record(serde_json::json!({ "id": "r-2", "title": "Alpha", "category": "Batch" })),
    ];

    let first = packager.pack(&records, None, None).await.unwrap();
    let second = packager.pack(&records, None, None).await.unwrap();

    // The deployment note carries the export timestamp; compare the entry
    // list and every other entry's bytes instead of the raw streams.
    let first_entries = entries_without_instructions(&first);
    let second_entries = entries_without_instructions(&second);
    assert_eq!(first_entries, second_entries);
}

fn entries_without_instructions(archive: &[u8]) -> Vec<(String, Vec<u8>)> {
    let decoder = zstd::Decoder::new(archive).unwrap();
    let mut tar = tar::Archive::new(decoder);
    tar.entries()
        .unwrap()
        .map(|e| {
            let mut e = e.unwrap();
            let path = e.path().unwrap().to_string_lossy().to_string();
            let mut data = Vec::new();
            std::io::Read::read_to_end(&mut e, &mut data).unwrap();
            (path, data)
        })
        .filter(|(path, _)| path != "DEPLOYMENT_INSTRUCTIONS.txt")
        .collect()
}
