//! Metadata store trait and the SQLite implementation.

use crate::error::{MetadataError, MetadataResult};
use crate::repos::{KeyRepo, UploadRepo, UserRepo};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use stash_core::KeySource;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Combined metadata store trait.
#[async_trait]
pub trait MetadataStore: KeyRepo + UploadRepo + UserRepo + Send + Sync {
    /// Run database migrations.
    async fn migrate(&self) -> MetadataResult<()>;

    /// Check database connectivity and health.
    async fn health_check(&self) -> MetadataResult<()>;
}

/// SQLite-based metadata store.
pub struct SqliteStore {
    pool: Pool<Sqlite>,
    keys: KeySource,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and run migrations.
    ///
    /// `:memory:` gives a private in-memory database.
    pub async fn new(path: impl AsRef<Path>, keys: KeySource) -> MetadataResult<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}?mode=rwc", path.display()))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            // Prevent transient "database is locked" errors under concurrent access.
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            // One connection serialises writers; it also keeps `:memory:` to a single database.
            .max_connections(1)
            .connect_with(opts)
            .await?;

        let store = Self { pool, keys };
        store.migrate().await?;

        tracing::debug!(path = %path.display(), "opened sqlite metadata store");
        Ok(store)
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }
}

#[async_trait]
impl MetadataStore for SqliteStore {
    async fn migrate(&self) -> MetadataResult<()> {
        sqlx::query(SCHEMA_SQL).execute(&self.pool).await?;
        Ok(())
    }

    async fn health_check(&self) -> MetadataResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

// Implement all the repository traits for SqliteStore
mod sqlite_impl {
    use super::*;
    use crate::models::{UploadRow, UserRow};
    use crate::repos::MAX_RESERVE_ATTEMPTS;
    use stash_core::{KeyGenerator, UploadRecord, User, hash_token, validate_username};
    use time::OffsetDateTime;
    use tracing::instrument;

    #[async_trait]
    impl KeyRepo for SqliteStore {
        #[instrument(skip(self), fields(backend = "sqlite"))]
        async fn file_key(&self) -> MetadataResult<String> {
            for attempt in 1..=MAX_RESERVE_ATTEMPTS {
                let candidate = self.keys.file_keys.generate()?;
                let result = sqlx::query(
                    r#"
                    INSERT INTO uploads (key, committed, created_at)
                    VALUES (?, 0, ?)
                    ON CONFLICT(key) DO NOTHING
                    "#,
                )
                .bind(&candidate)
                .bind(OffsetDateTime::now_utc())
                .execute(&self.pool)
                .await?;

                if result.rows_affected() == 1 {
                    return Ok(candidate);
                }
                tracing::debug!(attempt, "file key collision, retrying");
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
    impl UploadRepo for SqliteStore {
        #[instrument(skip(self, record), fields(backend = "sqlite", key = %record.key))]
        async fn record_put(&self, record: &UploadRecord) -> MetadataResult<()> {
            sqlx::query(
                r#"
                INSERT INTO uploads (
                    key, delete_key, filename, size, content_type, owner, committed, created_at
                ) VALUES (?, ?, ?, ?, ?, ?, 1, ?)
                ON CONFLICT(key) DO UPDATE SET
                    delete_key = excluded.delete_key,
                    filename = excluded.filename,
                    size = excluded.size,
                    content_type = excluded.content_type,
                    owner = excluded.owner,
                    committed = 1
                "#,
            )
            .bind(&record.key)
            .bind(&record.delete_key)
            .bind(&record.filename)
            .bind(record.size)
            .bind(&record.content_type)
            .bind(&record.owner)
            .bind(OffsetDateTime::now_utc())
            .execute(&self.pool)
            .await?;
            Ok(())
        }

        #[instrument(skip(self), fields(backend = "sqlite"))]
        async fn record_get(&self, key: &str) -> MetadataResult<UploadRecord> {
            let row = sqlx::query_as::<_, UploadRow>(
                "SELECT * FROM uploads WHERE key = ? AND committed = 1",
            )
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

            row.map(UploadRecord::from)
                .ok_or_else(|| MetadataError::NotFound(format!("upload {key}")))
        }

        #[instrument(skip(self), fields(backend = "sqlite"))]
        async fn record_delete(&self, key: &str) -> MetadataResult<()> {
            let result = sqlx::query("DELETE FROM uploads WHERE key = ? AND committed = 1")
                .bind(key)
                .execute(&self.pool)
                .await?;

            if result.rows_affected() == 0 {
                return Err(MetadataError::NotFound(format!("upload {key}")));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl UserRepo for SqliteStore {
        #[instrument(skip(self), fields(backend = "sqlite"))]
        async fn user_register(&self, name: &str) -> MetadataResult<User> {
            validate_username(name)?;
            let auth_token = self.keys.auth_tokens.generate()?;

            let row = UserRow {
                name: name.to_string(),
                token_hash: hash_token(&auth_token),
                created_at: OffsetDateTime::now_utc(),
            };
            let result = sqlx::query(
                r#"
                INSERT INTO users (name, token_hash, created_at)
                VALUES (?, ?, ?)
                ON CONFLICT(name) DO NOTHING
                "#,
            )
            .bind(&row.name)
            .bind(&row.token_hash)
            .bind(row.created_at)
            .execute(&self.pool)
            .await?;

            if result.rows_affected() == 0 {
                return Err(MetadataError::AlreadyExists(format!("user {name}")));
            }

            Ok(User {
                name: row.name,
                auth_token,
            })
        }

        #[instrument(skip_all, fields(backend = "sqlite"))]
        async fn user_by_auth_token(&self, token: &str) -> MetadataResult<User> {
            let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE token_hash = ?")
                .bind(hash_token(token))
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| MetadataError::NotFound("auth token".to_string()))?;

            Ok(User {
                name: row.name,
                auth_token: token.to_string(),
            })
        }
    }
}

/// SQL schema for SQLite.
const SCHEMA_SQL: &str = r#"
-- Uploads; committed = 0 marks a reserved key with no record yet
CREATE TABLE IF NOT EXISTS uploads (
    key TEXT PRIMARY KEY,
    delete_key TEXT NOT NULL DEFAULT '',
    filename TEXT NOT NULL DEFAULT '',
    size INTEGER NOT NULL DEFAULT 0,
    content_type TEXT NOT NULL DEFAULT '',
    owner TEXT NOT NULL DEFAULT '',
    committed INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_uploads_owner ON uploads(owner);

-- Registered users; tokens are stored as SHA-256 hex
CREATE TABLE IF NOT EXISTS users (
    name TEXT PRIMARY KEY,
    token_hash TEXT NOT NULL UNIQUE,
    created_at TEXT NOT NULL
);
"#;
