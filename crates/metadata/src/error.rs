//! Metadata store error types.

use thiserror::Error;

/// Metadata store operation errors.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// Key reservation kept colliding until the attempt budget ran out.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("key generation failed: {0}")]
    KeyGeneration(String),

    #[error("invalid username: {0}")]
    InvalidUsername(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl From<stash_core::Error> for MetadataError {
    fn from(e: stash_core::Error) -> Self {
        match e {
            stash_core::Error::KeyGeneration(msg) => Self::KeyGeneration(msg),
            stash_core::Error::InvalidUsername(msg) => Self::InvalidUsername(msg),
        }
    }
}

/// Result type for metadata operations.
pub type MetadataResult<T> = std::result::Result<T, MetadataError>;
