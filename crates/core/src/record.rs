//! Upload records.

use serde::{Deserialize, Serialize};

/// Metadata describing one uploaded file.
///
/// The same `key` addresses the blob in the blob store. `delete_key` is an
/// independent secret disclosed only to the uploader.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadRecord {
    pub key: String,
    #[serde(rename = "delete")]
    pub delete_key: String,
    #[serde(rename = "name")]
    pub filename: String,
    pub size: i64,
    #[serde(rename = "type")]
    pub content_type: String,
    #[serde(rename = "user")]
    pub owner: String,
}
