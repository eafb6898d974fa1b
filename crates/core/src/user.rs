//! Registered users.

use serde::{Deserialize, Serialize};

/// Maximum username length.
pub const MAX_USERNAME_LEN: usize = 64;

/// A registered uploader.
///
/// The auth token is only known in plaintext at registration time and when
/// presented by a client; stores persist its hash.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub auth_token: String,
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("name", &self.name)
            .field("auth_token", &"<redacted>")
            .finish()
    }
}

/// Validate a username.
///
/// Names appear verbatim as URL path segments, so only `[A-Za-z0-9._-]`
/// is accepted.
pub fn validate_username(name: &str) -> crate::Result<()> {
    if name.is_empty() || name.len() > MAX_USERNAME_LEN {
        return Err(crate::Error::InvalidUsername(format!(
            "length must be between 1 and {MAX_USERNAME_LEN}: {name:?}"
        )));
    }
    if name == "." || name == ".." {
        return Err(crate::Error::InvalidUsername(format!(
            "reserved name: {name:?}"
        )));
    }
    if let Some(c) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')))
    {
        return Err(crate::Error::InvalidUsername(format!(
            "invalid character {c:?} in {name:?}"
        )));
    }
    Ok(())
}
