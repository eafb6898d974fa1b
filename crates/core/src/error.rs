//! Error types for the core domain.

use thiserror::Error;

/// Core domain error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error("key generation failed: {0}")]
    KeyGeneration(String),

    #[error("invalid username: {0}")]
    InvalidUsername(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;
