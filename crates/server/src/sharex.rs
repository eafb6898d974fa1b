//! ShareX custom uploader definitions.

use crate::links::Links;
use serde::Serialize;
use stash_core::User;

#[derive(Debug, Serialize)]
pub struct ShareXHeaders {
    #[serde(rename = "Authorization")]
    pub authorization: String,
}

/// A `.sxcu` custom uploader for one registered user.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ShareXConfig {
    pub version: &'static str,
    pub name: &'static str,
    pub destination_type: &'static str,
    pub request_method: &'static str,
    #[serde(rename = "RequestURL")]
    pub request_url: String,
    pub headers: ShareXHeaders,
    pub body: &'static str,
    pub file_form_name: &'static str,
    #[serde(rename = "URL")]
    pub url: &'static str,
    #[serde(rename = "DeletionURL")]
    pub deletion_url: &'static str,
}

impl ShareXConfig {
    pub fn for_user(links: &Links, user: &User) -> Self {
        Self {
            version: "13.2.1",
            name: "Uploader",
            destination_type: "ImageUploader, TextUploader, FileUploader",
            request_method: "POST",
            request_url: links.upload_url(&user.name),
            headers: ShareXHeaders {
                authorization: format!("Bearer {}", user.auth_token),
            },
            body: "MultipartFormData",
            file_form_name: "file",
            url: "$json:results.url$",
            deletion_url: "$json:results.delete_url$",
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
