use bytes::Bytes;
use stash_storage::{BlobStore, FilesystemBackend, MemoryBackend};
use std::sync::Arc;
use tempfile::TempDir;

/// Generate deterministic test data using a seeded pseudo-random generator.
/// Same seed produces same output (reproducible tests).
pub fn seeded_bytes(seed: u64, len: usize) -> Bytes {
    let mut data = vec![0u8; len];
    let mut state = seed;

    for chunk in data.chunks_mut(8) {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
        let bytes = state.to_le_bytes();
        for (i, byte) in chunk.iter_mut().enumerate() {
            *byte = bytes[i % 8];
        }
    }

    Bytes::from(data)
}

/// Every backend under test, each paired with its name.
/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[allow(dead_code)]
pub struct TestBackends {
    pub backends: Vec<(&'static str, Arc<dyn BlobStore>)>,
    _temp_dir: TempDir,
}

#[allow(dead_code)]
impl TestBackends {
    pub async fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let filesystem = FilesystemBackend::new(temp_dir.path().join("blobs"))
            .await
            .expect("Failed to create filesystem backend");

        Self {
            backends: vec![
                ("filesystem", Arc::new(filesystem)),
                ("memory", Arc::new(MemoryBackend::new())),
            ],
            _temp_dir: temp_dir,
        }
    }
}
