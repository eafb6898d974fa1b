//! Application state shared across handlers.

use crate::links::Links;
use crate::service::UploadService;
use stash_core::config::AppConfig;
use stash_metadata::MetadataStore;
use stash_storage::BlobStore;
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Upload orchestration over both stores.
    pub service: Arc<UploadService>,
    /// Metadata store, for token lookup.
    pub metadata: Arc<dyn MetadataStore>,
    /// Public URL builder.
    pub links: Links,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        metadata: Arc<dyn MetadataStore>,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        let links = Links::new(&config.server.base_url);
        Self {
            config: Arc::new(config),
            service: Arc::new(UploadService::new(metadata.clone(), blobs)),
            metadata,
            links,
        }
    }
}
