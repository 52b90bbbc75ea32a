use thiserror::Error;

/// Errors surfaced by the design store and its substrates.
///
/// Read-path corruption never shows up here: `list`, `get_preferences` and
/// `get_catalog` collapse it into an empty result.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Substrate write failed: {0}")]
    SubstrateWrite(String),

    #[error("Substrate read failed: {0}")]
    SubstrateRead(String),

    #[error("Invalid import format: {0}")]
    InvalidImportFormat(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Raised while opening the environment; per-key failures use
    /// `SubstrateRead`/`SubstrateWrite` instead.
    #[error("LMDB error: {0}")]
    Lmdb(#[from] lmdb::Error),
}

impl StoreError {
    pub fn write(err: impl std::fmt::Display) -> Self {
        StoreError::SubstrateWrite(err.to_string())
    }

    pub fn read(err: impl std::fmt::Display) -> Self {
        StoreError::SubstrateRead(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
