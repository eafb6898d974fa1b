//! Public URLs handed back to uploaders.

use stash_core::UploadRecord;

/// Builds links under the configured public base URL.
#[derive(Clone, Debug)]
pub struct Links {
    base: String,
}

impl Links {
    pub fn new(base_url: &str) -> Self {
        Self {
            base: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// `{base}/files/{key}`
    pub fn file_url(&self, key: &str) -> String {
        format!("{}/files/{key}", self.base)
    }

    /// `{base}/uploads/{owner}/{key}/delete/{delete_key}`
    pub fn delete_url(&self, record: &UploadRecord) -> String {
        format!(
            "{}/uploads/{}/{}/delete/{}",
            self.base, record.owner, record.key, record.delete_key
        )
    }

    /// `{base}/uploads/{user}`
    pub fn upload_url(&self, user: &str) -> String {
        format!("{}/uploads/{user}", self.base)
    }
}
