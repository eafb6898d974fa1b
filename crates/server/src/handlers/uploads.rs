//! Upload and delete handlers.

use crate::auth::AuthenticatedUser;
use crate::error::{ApiError, ApiResponse, ApiResult};
use crate::state::AppState;
use axum::Json;
use axum::extract::multipart::Field;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use serde::Serialize;
use tokio::fs::File;
use tokio::io::{AsyncSeekExt, AsyncWriteExt};

/// Multipart field carrying the upload.
pub const FILE_FIELD: &str = "file";

/// Results of a successful upload.
#[derive(Debug, Serialize)]
pub struct UploadResults {
    pub url: String,
    pub delete_url: String,
    pub size: i64,
    pub filename: String,
}

/// POST /uploads/{user}
pub async fn upload_file(
    State(state): State<AppState>,
    Path(user): Path<String>,
    auth: AuthenticatedUser,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<ApiResponse<UploadResults>>)> {
    auth.require_user(&user)?;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let (mut file, size) = spool(field).await?;
        let record = state
            .service
            .upload(&mut file, &filename, size, &auth.user.name)
            .await?;

        tracing::info!(key = %record.key, owner = %record.owner, size, "file uploaded");

        let results = UploadResults {
            url: state.links.file_url(&record.key),
            delete_url: state.links.delete_url(&record),
            size: record.size,
            filename: record.filename,
        };
        return Ok((StatusCode::ACCEPTED, ApiResponse::success(results)));
    }

    Err(ApiError::MissingFile)
}

/// Copy a multipart field into an anonymous temp file so it can be rewound.
async fn spool(mut field: Field<'_>) -> ApiResult<(File, i64)> {
    let temp = tokio::task::spawn_blocking(tempfile::tempfile)
        .await
        .map_err(|e| ApiError::Internal(format!("spool task failed: {e}")))?
        .map_err(|e| ApiError::Internal(format!("failed to create spool file: {e}")))?;
    let mut file = File::from_std(temp);

    let mut size: i64 = 0;
    while let Some(chunk) = field.chunk().await? {
        file.write_all(&chunk)
            .await
            .map_err(|e| ApiError::Internal(format!("failed to spool upload: {e}")))?;
        size += chunk.len() as i64;
    }
    file.flush()
        .await
        .map_err(|e| ApiError::Internal(format!("failed to spool upload: {e}")))?;
    file.rewind()
        .await
        .map_err(|e| ApiError::Internal(format!("failed to rewind spool file: {e}")))?;

    Ok((file, size))
}

/// DELETE /uploads/{user}/{key}
pub async fn delete_upload(
    State(state): State<AppState>,
    Path((user, key)): Path<(String, String)>,
    auth: AuthenticatedUser,
) -> ApiResult<Json<ApiResponse<bool>>> {
    auth.require_user(&user)?;
    state.service.delete_owned(&key, &auth.user.name).await?;

    tracing::info!(key = %key, owner = %user, "file deleted");
    Ok(ApiResponse::success(true))
}

/// GET /uploads/{user}/{key}/delete/{secret}
///
/// Possession of the delete secret is the only authorization; `{user}` is
/// not consulted.
pub async fn delete_public(
    State(state): State<AppState>,
    Path((_user, key, secret)): Path<(String, String, String)>,
) -> ApiResult<Json<ApiResponse<bool>>> {
    state.service.delete_public(&key, &secret).await?;

    tracing::info!(key = %key, "file deleted with delete key");
    Ok(ApiResponse::success(true))
}
