//! Metadata store test utilities.

use stash_core::{KeyGenerator, KeySource, UploadRecord};
use stash_metadata::{MemoryStore, MetadataResult, MetadataStore, SqliteStore};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// A test metadata store wrapper that cleans up on drop.
#[allow(dead_code)]
pub struct TestMetadata {
    pub store: Arc<dyn MetadataStore>,
    _temp_dir: TempDir,
}

#[allow(dead_code)]
impl TestMetadata {
    /// SQLite store in a fresh temp directory.
    pub async fn sqlite(keys: KeySource) -> MetadataResult<Self> {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let store = SqliteStore::new(temp_dir.path().join("test.db"), keys).await?;

        Ok(Self {
            store: Arc::new(store),
            _temp_dir: temp_dir,
        })
    }

    /// In-memory store.
    pub fn memory(keys: KeySource) -> Self {
        Self {
            store: Arc::new(MemoryStore::new(keys)),
            _temp_dir: tempfile::tempdir().expect("Failed to create temp directory"),
        }
    }

    pub fn store(&self) -> Arc<dyn MetadataStore> {
        self.store.clone()
    }
}

/// Run a test against both the SQLite and in-memory backends.
///
/// `keys` is called once per backend so stateful generators start fresh.
#[allow(dead_code)]
pub async fn run_metadata_test_both<K, F, Fut>(keys: K, test_fn: F)
where
    K: Fn() -> KeySource,
    F: Fn(Arc<dyn MetadataStore>) -> Fut + Clone,
    Fut: std::future::Future<Output = ()>,
{
    let sqlite = TestMetadata::sqlite(keys())
        .await
        .expect("Failed to create SQLite test metadata");
    test_fn.clone()(sqlite.store()).await;

    let memory = TestMetadata::memory(keys());
    test_fn(memory.store()).await;
}

/// Yields a scripted sequence of keys, then repeats the last one forever.
#[allow(dead_code)]
pub struct ScriptedKeys {
    values: Mutex<VecDeque<String>>,
    last: Mutex<String>,
}

#[allow(dead_code)]
impl ScriptedKeys {
    pub fn new(values: &[&str]) -> Self {
        Self {
            values: Mutex::new(values.iter().map(|v| v.to_string()).collect()),
            last: Mutex::new(values.last().copied().unwrap_or_default().to_string()),
        }
    }
}

impl KeyGenerator for ScriptedKeys {
    fn generate(&self) -> stash_core::Result<String> {
        let next = self.values.lock().unwrap().pop_front();
        match next {
            Some(value) => {
                *self.last.lock().unwrap() = value.clone();
                Ok(value)
            }
            None => Ok(self.last.lock().unwrap().clone()),
        }
    }
}

/// A committed record for `key` owned by `owner`.
#[allow(dead_code)]
pub fn sample_record(key: &str, owner: &str) -> UploadRecord {
    UploadRecord {
        key: key.to_string(),
        delete_key: format!("secret-{key}"),
        filename: "a.txt".to_string(),
        size: 13,
        content_type: "text/plain; charset=utf-8".to_string(),
        owner: owner.to_string(),
    }
}
