//! Portable recipe archives.
//!
//! An archive is a zstd-compressed tar tree: one folder per recipe holding
//! `recipe.json` and its attachments, plus a root `index.json` and a
//! human-readable deployment note. The packager and unpacker are the two
//! halves of the same private contract — the format is not an interchange
//! standard for other tools.

pub mod direct;
pub mod layout;
pub mod packager;
pub mod progress;
pub mod unpacker;

pub use direct::{
    DirectExport, ExportMetadata, build_direct_export, import_direct_payload,
    normalize_import_payload,
};
pub use layout::{ArchiveIndex, ArchiveIndexEntry};
pub use packager::ArchivePackager;
pub use progress::{ExportProgress, ProgressFn};
pub use unpacker::{ArchiveUnpacker, ImportOutcome, ImportSkip};
