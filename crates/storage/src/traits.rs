//! Storage trait definitions.

use crate::error::StorageResult;
use async_trait::async_trait;
use std::pin::Pin;
use tokio::io::AsyncRead;

/// A boxed reader over a stored blob. Dropping it releases the handle.
pub type BlobReader = Pin<Box<dyn AsyncRead + Send>>;

/// Byte storage addressed by key. Blobs carry no metadata of their own.
#[async_trait]
pub trait BlobStore: Send + Sync + 'static {
    /// Check if a blob exists.
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Copy `reader` to the blob at `key` until EOF, replacing any previous
    /// content. Returns the number of bytes stored.
    async fn put(&self, key: &str, reader: &mut (dyn AsyncRead + Unpin + Send))
    -> StorageResult<u64>;

    /// Open the blob at `key` for reading.
    async fn get(&self, key: &str) -> StorageResult<BlobReader>;

    /// Remove the blob at `key`.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Get the backend name for logging.
    fn backend_name(&self) -> &'static str;

    /// Check backend health.
    async fn health_check(&self) -> StorageResult<()>;
}
