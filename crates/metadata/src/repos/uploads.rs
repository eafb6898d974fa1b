//! Upload record repository.

use crate::error::MetadataResult;
use async_trait::async_trait;
use stash_core::UploadRecord;

/// Repository for upload records.
#[async_trait]
pub trait UploadRepo: Send + Sync {
    /// Write the full record, replacing a reservation placeholder if present.
    async fn record_put(&self, record: &UploadRecord) -> MetadataResult<()>;

    /// Get a record by key. Reserved but unwritten keys are `NotFound`.
    async fn record_get(&self, key: &str) -> MetadataResult<UploadRecord>;

    /// Delete a record by key.
    async fn record_delete(&self, key: &str) -> MetadataResult<()>;
}
