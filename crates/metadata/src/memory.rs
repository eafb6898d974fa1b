//! In-memory metadata store.

use crate::error::{MetadataError, MetadataResult};
use crate::repos::{KeyRepo, MAX_RESERVE_ATTEMPTS, UploadRepo, UserRepo};
use crate::store::MetadataStore;
use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use stash_core::{KeyGenerator, KeySource, UploadRecord, User, hash_token, validate_username};
use tracing::instrument;

#[derive(Debug, Clone)]
enum Slot {
    Reserved,
    Committed(UploadRecord),
}

/// Metadata store backed by concurrent hash maps.
///
/// Nothing survives a restart; intended for tests and throwaway instances.
pub struct MemoryStore {
    uploads: DashMap<String, Slot>,
    /// name -> token hash
    users: DashMap<String, String>,
    /// token hash -> name
    tokens: DashMap<String, String>,
    keys: KeySource,
}

impl MemoryStore {
    pub fn new(keys: KeySource) -> Self {
        Self {
            uploads: DashMap::new(),
            users: DashMap::new(),
            tokens: DashMap::new(),
            keys,
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(KeySource::random())
    }
}

#[async_trait]
impl KeyRepo for MemoryStore {
    #[instrument(skip(self), fields(backend = "memory"))]
    async fn file_key(&self) -> MetadataResult<String> {
        for attempt in 1..=MAX_RESERVE_ATTEMPTS {
            let candidate = self.keys.file_keys.generate()?;
            match self.uploads.entry(candidate) {
                Entry::Vacant(entry) => {
                    let key = entry.key().clone();
                    entry.insert(Slot::Reserved);
                    return Ok(key);
                }
                Entry::Occupied(_) => {
                    tracing::debug!(attempt, "file key collision, retrying");
                }
            }
        }

        Err(MetadataError::Conflict(format!(
            "no free file key after {MAX_RESERVE_ATTEMPTS} attempts"
        )))
    }

    async fn delete_key(&self) -> MetadataResult<String> {
        Ok(self.keys.delete_keys.generate()?)
    }
}

#[async_trait]
impl UploadRepo for MemoryStore {
    async fn record_put(&self, record: &UploadRecord) -> MetadataResult<()> {
        self.uploads
            .insert(record.key.clone(), Slot::Committed(record.clone()));
        Ok(())
    }

    async fn record_get(&self, key: &str) -> MetadataResult<UploadRecord> {
        match self.uploads.get(key).as_deref() {
            Some(Slot::Committed(record)) => Ok(record.clone()),
            _ => Err(MetadataError::NotFound(format!("upload {key}"))),
        }
    }

    async fn record_delete(&self, key: &str) -> MetadataResult<()> {
        self.uploads
            .remove_if(key, |_, slot| matches!(slot, Slot::Committed(_)))
            .map(|_| ())
            .ok_or_else(|| MetadataError::NotFound(format!("upload {key}")))
    }
}

#[async_trait]
impl UserRepo for MemoryStore {
    #[instrument(skip(self), fields(backend = "memory"))]
    async fn user_register(&self, name: &str) -> MetadataResult<User> {
        validate_username(name)?;
        let auth_token = self.keys.auth_tokens.generate()?;
        let token_hash = hash_token(&auth_token);

        match self.users.entry(name.to_string()) {
            Entry::Occupied(_) => Err(MetadataError::AlreadyExists(format!("user {name}"))),
            Entry::Vacant(entry) => {
                if self.tokens.contains_key(&token_hash) {
                    return Err(MetadataError::AlreadyExists("auth token".to_string()));
                }
                self.tokens.insert(token_hash.clone(), name.to_string());
                entry.insert(token_hash);
                Ok(User {
                    name: name.to_string(),
                    auth_token,
                })
            }
        }
    }

    async fn user_by_auth_token(&self, token: &str) -> MetadataResult<User> {
        let name = self
            .tokens
            .get(&hash_token(token))
            .map(|name| name.value().clone())
            .ok_or_else(|| MetadataError::NotFound("auth token".to_string()))?;

        Ok(User {
            name,
            auth_token: token.to_string(),
        })
    }
}

#[async_trait]
impl MetadataStore for MemoryStore {
    async fn migrate(&self) -> MetadataResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> MetadataResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_placeholder_survives_record_delete() {
        let store = MemoryStore::new(KeySource::sequential());
        let key = store.file_key().await.unwrap();

        assert!(matches!(
            store.record_delete(&key).await,
            Err(MetadataError::NotFound(_))
        ));
        // Still reserved, so the next reservation moves on.
        assert_eq!(store.file_key().await.unwrap(), "2");
    }

    #[tokio::test]
    async fn test_delete_frees_the_key() {
        let store = MemoryStore::new(KeySource::sequential());
        let key = store.file_key().await.unwrap();
        store
            .record_put(&UploadRecord {
                key: key.clone(),
                delete_key: "d".to_string(),
                filename: "a.txt".to_string(),
                size: 1,
                content_type: "text/plain; charset=utf-8".to_string(),
                owner: "alice".to_string(),
            })
            .await
            .unwrap();

        store.record_delete(&key).await.unwrap();
        assert!(store.uploads.is_empty());
    }
}
