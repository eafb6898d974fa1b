//! Key and secret generation strategies.
//!
//! File keys, delete keys and auth tokens all come from a [`KeyGenerator`].
//! Production code uses [`RandomKeys`]; tests swap in [`SequentialKeys`] or
//! [`FixedKey`] through a [`KeySource`] so that no global state is involved.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::TryRngCore;
use rand::rngs::OsRng;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Random bytes behind file keys and delete keys.
pub const KEY_BYTES: usize = 8;

/// Random bytes behind user auth tokens.
pub const AUTH_TOKEN_BYTES: usize = 32;

/// Attempts made against the random source before giving up.
pub const MAX_RANDOM_ATTEMPTS: usize = 32;

/// A strategy for producing opaque, path-safe keys.
pub trait KeyGenerator: Send + Sync {
    /// Produce the next key.
    fn generate(&self) -> crate::Result<String>;
}

/// Cryptographically random keys encoded as unpadded URL-safe base64.
#[derive(Clone, Copy, Debug)]
pub struct RandomKeys {
    len: usize,
}

impl RandomKeys {
    /// Keys backed by [`KEY_BYTES`] random bytes.
    pub fn new() -> Self {
        Self { len: KEY_BYTES }
    }

    /// Keys backed by `len` random bytes.
    pub fn with_len(len: usize) -> Self {
        Self { len }
    }
}

impl Default for RandomKeys {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyGenerator for RandomKeys {
    fn generate(&self) -> crate::Result<String> {
        random_key(&mut OsRng, self.len)
    }
}

/// Fill `len` bytes from `rng` and encode them, retrying transient failures.
pub(crate) fn random_key<R: TryRngCore>(rng: &mut R, len: usize) -> crate::Result<String> {
    let mut bytes = vec![0u8; len];
    let mut last_error = String::new();
    for _ in 0..MAX_RANDOM_ATTEMPTS {
        match rng.try_fill_bytes(&mut bytes) {
            Ok(()) => return Ok(URL_SAFE_NO_PAD.encode(&bytes)),
            Err(e) => last_error = e.to_string(),
        }
    }
    Err(crate::Error::KeyGeneration(format!(
        "random source failed {MAX_RANDOM_ATTEMPTS} times: {last_error}"
    )))
}

/// Deterministic keys "1", "2", "3", ...
#[derive(Debug)]
pub struct SequentialKeys {
    next: AtomicU64,
}

impl SequentialKeys {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    pub fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }
}

impl Default for SequentialKeys {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyGenerator for SequentialKeys {
    fn generate(&self) -> crate::Result<String> {
        Ok(self.next.fetch_add(1, Ordering::Relaxed).to_string())
    }
}

/// Always yields the same value.
#[derive(Clone, Debug)]
pub struct FixedKey(String);

impl FixedKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

impl KeyGenerator for FixedKey {
    fn generate(&self) -> crate::Result<String> {
        Ok(self.0.clone())
    }
}

/// The set of generators a metadata store draws from.
#[derive(Clone)]
pub struct KeySource {
    pub file_keys: Arc<dyn KeyGenerator>,
    pub delete_keys: Arc<dyn KeyGenerator>,
    pub auth_tokens: Arc<dyn KeyGenerator>,
}

impl KeySource {
    /// Random file keys, delete keys and auth tokens.
    pub fn random() -> Self {
        Self {
            file_keys: Arc::new(RandomKeys::new()),
            delete_keys: Arc::new(RandomKeys::new()),
            auth_tokens: Arc::new(RandomKeys::with_len(AUTH_TOKEN_BYTES)),
        }
    }

    /// Sequential file keys; delete keys and auth tokens stay random.
    pub fn sequential() -> Self {
        Self::random().with_file_keys(SequentialKeys::new())
    }

    pub fn with_file_keys(mut self, generator: impl KeyGenerator + 'static) -> Self {
        self.file_keys = Arc::new(generator);
        self
    }

    pub fn with_delete_keys(mut self, generator: impl KeyGenerator + 'static) -> Self {
        self.delete_keys = Arc::new(generator);
        self
    }

    pub fn with_auth_tokens(mut self, generator: impl KeyGenerator + 'static) -> Self {
        self.auth_tokens = Arc::new(generator);
        self
    }
}

impl Default for KeySource {
    fn default() -> Self {
        Self::random()
    }
}

impl fmt::Debug for KeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeySource").finish_non_exhaustive()
    }
}
