//! Secret hashing and comparison.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Hash a token for storage lookup (lowercase SHA-256 hex).
pub fn hash_token(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// Compare a presented secret against the stored one in constant time.
///
/// Both sides are reduced to fixed-size SHA-256 digests first so neither the
/// position of the first differing byte nor the secret length affects timing.
pub fn secrets_match(presented: &str, stored: &str) -> bool {
    let presented = Sha256::digest(presented.as_bytes());
    let stored = Sha256::digest(stored.as_bytes());
    presented.as_slice().ct_eq(stored.as_slice()).into()
}
