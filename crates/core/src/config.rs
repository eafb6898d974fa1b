//! Configuration types shared across crates.

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

/// Server configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "[::1]:8080").
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Public base URL used to build file and delete links
    /// (e.g., "https://files.example.com").
    #[serde(default)]
    pub base_url: String,
    /// Maximum accepted upload request body in bytes.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: usize,
}

fn default_bind() -> String {
    "[::1]:8080".to_string()
}

fn default_max_upload_size() -> usize {
    512 * 1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            base_url: String::new(),
            max_upload_size: default_max_upload_size(),
        }
    }
}

impl ServerConfig {
    /// Validate server configuration invariants.
    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.is_empty() {
            return Err("server.base_url must be set to the public URL of this service".to_string());
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(format!(
                "server.base_url must start with http:// or https://: {}",
                self.base_url
            ));
        }
        if self.max_upload_size == 0 {
            return Err("server.max_upload_size must be greater than zero".to_string());
        }
        self.bind_addr(None, None).map(|_| ())
    }

    /// Resolve the listen address, replacing the host and/or port of `bind`.
    ///
    /// `addr` may be a bare IP or a bracketed IPv6 literal.
    pub fn bind_addr(&self, addr: Option<&str>, port: Option<u16>) -> Result<SocketAddr, String> {
        let mut bind: SocketAddr = self
            .bind
            .parse()
            .map_err(|e| format!("invalid server.bind {:?}: {e}", self.bind))?;

        if let Some(addr) = addr {
            let host = addr.trim_start_matches('[').trim_end_matches(']');
            let ip: IpAddr = host
                .parse()
                .map_err(|e| format!("invalid listen address {addr:?}: {e}"))?;
            bind.set_ip(ip);
        }
        if let Some(port) = port {
            bind.set_port(port);
        }
        Ok(bind)
    }
}

/// Blob storage backend configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageConfig {
    /// Local filesystem storage.
    Filesystem {
        /// Root directory for uploaded files.
        path: PathBuf,
    },
    /// Process-local storage; contents are lost on restart.
    Memory,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::Filesystem {
            path: PathBuf::from("./data/files"),
        }
    }
}

impl StorageConfig {
    /// Validate storage configuration invariants.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            StorageConfig::Filesystem { path } if path.as_os_str().is_empty() => {
                Err("filesystem storage requires a non-empty path".to_string())
            }
            _ => Ok(()),
        }
    }
}

/// Metadata store configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MetadataConfig {
    /// SQLite database.
    Sqlite {
        /// Database file path.
        path: PathBuf,
    },
    /// Process-local store; contents are lost on restart.
    Memory,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self::Sqlite {
            path: PathBuf::from("./data/metadata.db"),
        }
    }
}

impl MetadataConfig {
    /// Validate metadata configuration invariants.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            MetadataConfig::Sqlite { path } if path.as_os_str().is_empty() => {
                Err("sqlite metadata requires a non-empty path".to_string())
            }
            _ => Ok(()),
        }
    }
}

/// Complete application configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Blob storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Metadata store configuration.
    #[serde(default)]
    pub metadata: MetadataConfig,
}

impl AppConfig {
    /// Create a test configuration with in-memory stores.
    ///
    /// **For testing only.**
    pub fn for_testing() -> Self {
        Self {
            server: ServerConfig {
                base_url: "http://localhost:8080".to_string(),
                ..ServerConfig::default()
            },
            storage: StorageConfig::Memory,
            metadata: MetadataConfig::Memory,
        }
    }

    /// Validate the whole configuration.
    pub fn validate(&self) -> Result<(), String> {
        self.server.validate()?;
        self.storage.validate()?;
        self.metadata.validate()
    }
}
