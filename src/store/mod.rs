//! Storage capabilities the archive core depends on.

pub mod file_store;
pub mod static_assets;

pub use file_store::{FileStore, FsFileStore, MemoryFileStore};
pub use static_assets::{FsStaticAssets, NoStaticAssets, StaticAssets};
