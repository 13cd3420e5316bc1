use thiserror::Error;

/// Crate-wide error type.
///
/// Variants carry human-readable context assembled at the call site; only
/// operation-fatal conditions surface through this type. Per-record and
/// per-attachment problems are absorbed by the archive pipeline and
/// reported as aggregate warnings instead.
#[derive(Error, Debug)]
pub enum VaultError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Missing config: {0}")]
    MissingConfig(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("Compression error: {0}")]
    Compression(String),

    #[error("no valid recipes found in import payload")]
    NoValidRecipes,
}

// Convenient crate-wide result type
pub type Result<T> = std::result::Result<T, VaultError>;
