//! Server test utilities.

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::Value;
use stash_core::config::AppConfig;
use stash_core::{FixedKey, KeySource, SequentialKeys};
use stash_metadata::{MetadataStore, SqliteStore, UserRepo};
use stash_server::{AppState, create_router};
use stash_storage::{BlobStore, FilesystemBackend};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

/// Boundary used by [`multipart_body`].
pub const BOUNDARY: &str = "stash-test-boundary";

/// A test server wrapper with all dependencies.
/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[allow(dead_code)]
pub struct TestServer {
    pub router: axum::Router,
    pub state: AppState,
    _temp_dir: TempDir,
}

#[allow(dead_code)]
impl TestServer {
    /// Filesystem blobs and SQLite metadata in a temp directory.
    ///
    /// File keys count up from "1" and every delete key is "delete".
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Create a test server with custom config modifications.
    pub async fn with_config<F>(modifier: F) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");

        let blobs: Arc<dyn BlobStore> = Arc::new(
            FilesystemBackend::new(temp_dir.path().join("files"))
                .await
                .expect("Failed to create storage backend"),
        );

        let keys = KeySource::random()
            .with_file_keys(SequentialKeys::new())
            .with_delete_keys(FixedKey::new("delete"));
        let metadata: Arc<dyn MetadataStore> = Arc::new(
            SqliteStore::new(temp_dir.path().join("metadata.db"), keys)
                .await
                .expect("Failed to create metadata store"),
        );

        let mut config = AppConfig::for_testing();
        config.server.base_url = "http://files.test".to_string();
        modifier(&mut config);

        let state = AppState::new(config, metadata, blobs);
        let router = create_router(state.clone());

        Self {
            router,
            state,
            _temp_dir: temp_dir,
        }
    }

    /// Register a user and return their auth token.
    pub async fn register(&self, name: &str) -> String {
        self.state
            .metadata
            .user_register(name)
            .await
            .expect("Failed to register user")
            .auth_token
    }

    /// Send a request and collect the status, headers and body.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec();
        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Send a request without a body.
    pub async fn request(&self, method: &str, uri: &str, auth_token: Option<&str>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = auth_token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    /// POST a multipart upload with a single part.
    pub async fn upload(
        &self,
        user: &str,
        auth_token: Option<&str>,
        field: &str,
        filename: &str,
        content: &[u8],
    ) -> TestResponse {
        let mut builder = Request::builder()
            .method("POST")
            .uri(format!("/uploads/{user}"))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            );
        if let Some(token) = auth_token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = multipart_body(field, filename, content);
        self.send(builder.body(Body::from(body)).unwrap()).await
    }
}

/// Collected response.
#[allow(dead_code)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Vec<u8>,
}

#[allow(dead_code)]
impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }

    pub fn header(&self, name: header::HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Encode one form-data part.
#[allow(dead_code)]
pub fn multipart_body(field: &str, filename: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}
