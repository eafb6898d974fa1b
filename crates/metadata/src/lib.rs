//! Metadata store abstraction and implementations for stash.
//!
//! This crate provides the record-keeping half of the service:
//! - File key reservation and delete secret generation
//! - Upload records keyed by file key
//! - Registered users and auth token lookup

pub mod error;
pub mod memory;
pub mod models;
pub mod repos;
pub mod store;

pub use error::{MetadataError, MetadataResult};
pub use memory::MemoryStore;
pub use repos::{KeyRepo, MAX_RESERVE_ATTEMPTS, UploadRepo, UserRepo};
pub use store::{MetadataStore, SqliteStore};

use stash_core::KeySource;
use stash_core::config::MetadataConfig;
use std::sync::Arc;

/// Create a metadata store from configuration.
pub async fn from_config(
    config: &MetadataConfig,
    keys: KeySource,
) -> MetadataResult<Arc<dyn MetadataStore>> {
    config.validate().map_err(MetadataError::Config)?;

    match config {
        MetadataConfig::Sqlite { path } => {
            let store = SqliteStore::new(path, keys).await?;
            Ok(Arc::new(store) as Arc<dyn MetadataStore>)
        }
        MetadataConfig::Memory => {
            tracing::warn!("using in-memory metadata store; records are lost on restart");
            Ok(Arc::new(MemoryStore::new(keys)) as Arc<dyn MetadataStore>)
        }
    }
}
