//! Database models mapping to the metadata schema.

use sqlx::FromRow;
use stash_core::UploadRecord;
use time::OffsetDateTime;

/// Row in the `uploads` table.
///
/// A reserved key has a row with `committed = false` and empty fields until
/// the full record is written over it.
#[derive(Debug, Clone, FromRow)]
pub struct UploadRow {
    pub key: String,
    pub delete_key: String,
    pub filename: String,
    pub size: i64,
    pub content_type: String,
    pub owner: String,
    pub committed: bool,
    pub created_at: OffsetDateTime,
}

impl From<UploadRow> for UploadRecord {
    fn from(row: UploadRow) -> Self {
        UploadRecord {
            key: row.key,
            delete_key: row.delete_key,
            filename: row.filename,
            size: row.size,
            content_type: row.content_type,
            owner: row.owner,
        }
    }
}

/// Row in the `users` table. Only the token hash is persisted.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub name: String,
    pub token_hash: String,
    pub created_at: OffsetDateTime,
}
