//! In-memory storage backend.

use crate::error::{StorageError, StorageResult};
use crate::traits::{BlobReader, BlobStore};
use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use std::io::Cursor;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::instrument;

/// Blob store that keeps every blob in process memory.
#[derive(Default)]
pub struct MemoryBackend {
    blobs: DashMap<String, Bytes>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blobs.
    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }

    /// Direct access to a blob's content.
    pub fn contents(&self, key: &str) -> Option<Bytes> {
        self.blobs.get(key).map(|entry| entry.value().clone())
    }
}

#[async_trait]
impl BlobStore for MemoryBackend {
    async fn exists(&self, key: &str) -> StorageResult<bool> {
        Ok(self.blobs.contains_key(key))
    }

    #[instrument(skip(self, reader), fields(backend = "memory"))]
    async fn put(
        &self,
        key: &str,
        reader: &mut (dyn AsyncRead + Unpin + Send),
    ) -> StorageResult<u64> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data).await?;
        let written = data.len() as u64;
        self.blobs.insert(key.to_string(), Bytes::from(data));
        Ok(written)
    }

    #[instrument(skip(self), fields(backend = "memory"))]
    async fn get(&self, key: &str) -> StorageResult<BlobReader> {
        let data = self
            .contents(key)
            .ok_or_else(|| StorageError::NotFound(key.to_string()))?;
        Ok(Box::pin(Cursor::new(data)))
    }

    #[instrument(skip(self), fields(backend = "memory"))]
    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.blobs
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn health_check(&self) -> StorageResult<()> {
        Ok(())
    }
}
