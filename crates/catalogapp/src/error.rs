use crate::model::ProductId;
use std::path::PathBuf;
use thiserror::Error;

/// Failures raised by the storage engine underneath the record store.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database version {found} is newer than supported version {supported}")]
    VersionConflict { found: u32, supported: u32 },

    #[error("Corrupt database: {0}")]
    Corrupt(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Errors surfaced by [`crate::store::RecordStore`] operations.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Could not open database: {0}")]
    Open(#[source] EngineError),

    #[error("Could not read products: {0}")]
    Read(#[source] EngineError),

    #[error("Could not write products: {0}")]
    Write(#[source] EngineError),

    #[error("Product not found: {0}")]
    NotFound(ProductId),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Could not read image {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Not an image file: {path} ({mime})")]
    NotAnImage { path: PathBuf, mime: String },

    #[error("Image {path} is {size} bytes, limit is {limit}")]
    TooLarge { path: PathBuf, size: u64, limit: u64 },
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Image(#[from] ImageError),

    #[error("Config error: {0}")]
    Config(#[from] confique::Error),

    /// Settings or paths could not be resolved.
    #[error("Setup error: {0}")]
    Setup(String),
}

pub type Result<T> = std::result::Result<T, CatalogError>;
