//! User repository.

use crate::error::MetadataResult;
use async_trait::async_trait;
use stash_core::User;

/// Repository for registered users.
#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Register a user and mint their auth token.
    ///
    /// The returned [`User`] carries the plaintext token; it is not
    /// recoverable afterwards.
    async fn user_register(&self, name: &str) -> MetadataResult<User>;

    /// Resolve a presented auth token to its user.
    async fn user_by_auth_token(&self, token: &str) -> MetadataResult<User>;
}
