//! Key reservation repository.

use crate::error::MetadataResult;
use async_trait::async_trait;

/// Candidate keys tried by [`KeyRepo::file_key`] before it reports a conflict.
pub const MAX_RESERVE_ATTEMPTS: usize = 1024;

/// Repository for file key reservation and delete secrets.
#[async_trait]
pub trait KeyRepo: Send + Sync {
    /// Reserve a file key that no live record or pending reservation holds.
    ///
    /// Each candidate is claimed with an atomic insert-if-absent; colliding
    /// candidates are discarded and a fresh one is generated.
    async fn file_key(&self) -> MetadataResult<String>;

    /// Generate a delete secret. Nothing is reserved.
    async fn delete_key(&self) -> MetadataResult<String>;
}
