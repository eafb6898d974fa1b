//! Upload orchestration over the metadata and blob stores.
//!
//! [`UploadService`] owns the ordering between the two stores:
//!
//! - upload: reserve key, sniff, write the record, then copy the blob
//! - get: record first, then blob; a record without a blob is `NotFound`
//! - delete: record first, then blob
//!
//! A failed blob write leaves the record behind. Reads of such a key report
//! `NotFound`, so no rollback is attempted.

use stash_core::{SNIFF_LEN, UploadRecord, detect_content_type, secrets_match};
use stash_metadata::{KeyRepo, MetadataError, MetadataStore, UploadRepo};
use stash_storage::{BlobReader, BlobStore, StorageError};
use std::io::SeekFrom;
use std::sync::Arc;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeek, AsyncSeekExt};
use tracing::instrument;

/// Errors returned by [`UploadService`].
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("delete secret does not match")]
    Unauthorized,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("key generation failed: {0}")]
    Generation(String),

    #[error("metadata error: {0}")]
    Metadata(MetadataError),

    #[error("storage error: {0}")]
    Storage(StorageError),

    #[error("upload stream error: {0}")]
    Stream(#[source] std::io::Error),
}

impl From<MetadataError> for ServiceError {
    fn from(e: MetadataError) -> Self {
        match e {
            MetadataError::NotFound(what) => Self::NotFound(what),
            MetadataError::Conflict(msg) => Self::Conflict(msg),
            MetadataError::KeyGeneration(msg) => Self::Generation(msg),
            other => Self::Metadata(other),
        }
    }
}

impl From<StorageError> for ServiceError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound(what) => Self::NotFound(what),
            other => Self::Storage(other),
        }
    }
}

/// Result type for service operations.
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

/// Coordinates upload records and blobs that share a key.
pub struct UploadService {
    metadata: Arc<dyn MetadataStore>,
    blobs: Arc<dyn BlobStore>,
}

impl UploadService {
    pub fn new(metadata: Arc<dyn MetadataStore>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { metadata, blobs }
    }

    /// Store `stream` under a freshly reserved key.
    ///
    /// The stream is read once for content sniffing, rewound to offset 0 and
    /// then copied to blob storage in full. The caller keeps ownership of the
    /// stream on every path.
    #[instrument(skip(self, stream), fields(backend = self.blobs.backend_name()))]
    pub async fn upload<R>(
        &self,
        stream: &mut R,
        filename: &str,
        size: i64,
        owner: &str,
    ) -> ServiceResult<UploadRecord>
    where
        R: AsyncRead + AsyncSeek + Unpin + Send,
    {
        let key = self.metadata.file_key().await?;
        let delete_key = self.metadata.delete_key().await?;

        let mut head = Vec::with_capacity(SNIFF_LEN);
        (&mut *stream)
            .take(SNIFF_LEN as u64)
            .read_to_end(&mut head)
            .await
            .map_err(ServiceError::Stream)?;
        let content_type = detect_content_type(&head);
        stream
            .seek(SeekFrom::Start(0))
            .await
            .map_err(ServiceError::Stream)?;

        let record = UploadRecord {
            key,
            delete_key,
            filename: filename.to_string(),
            size,
            content_type: content_type.to_string(),
            owner: owner.to_string(),
        };
        self.metadata.record_put(&record).await?;
        self.blobs.put(&record.key, stream).await?;

        tracing::debug!(key = %record.key, content_type, "upload stored");
        Ok(record)
    }

    /// Look up a record and open its blob.
    #[instrument(skip(self), fields(backend = self.blobs.backend_name()))]
    pub async fn get(&self, key: &str) -> ServiceResult<(UploadRecord, BlobReader)> {
        let record = self.metadata.record_get(key).await?;
        let reader = self.blobs.get(key).await?;
        Ok((record, reader))
    }

    /// Remove the record, then the blob.
    #[instrument(skip(self), fields(backend = self.blobs.backend_name()))]
    pub async fn delete(&self, key: &str) -> ServiceResult<()> {
        self.metadata.record_delete(key).await?;
        self.blobs.delete(key).await?;
        Ok(())
    }

    /// Delete on behalf of an authenticated user.
    ///
    /// Uploads owned by someone else read as `NotFound`.
    #[instrument(skip(self), fields(backend = self.blobs.backend_name()))]
    pub async fn delete_owned(&self, key: &str, owner: &str) -> ServiceResult<()> {
        let record = self.metadata.record_get(key).await?;
        if record.owner != owner {
            return Err(ServiceError::NotFound(format!("upload {key}")));
        }
        self.delete(key).await
    }

    /// Delete by presenting the upload's delete secret.
    #[instrument(skip(self, secret), fields(backend = self.blobs.backend_name()))]
    pub async fn delete_public(&self, key: &str, secret: &str) -> ServiceResult<()> {
        let record = self.metadata.record_get(key).await?;
        if !secrets_match(secret, &record.delete_key) {
            return Err(ServiceError::Unauthorized);
        }
        self.delete(key).await
    }

    /// Check both stores.
    pub async fn health_check(&self) -> ServiceResult<()> {
        self.metadata.health_check().await?;
        self.blobs.health_check().await?;
        Ok(())
    }
}
