//! Public file retrieval.

use crate::error::ApiResult;
use crate::state::AppState;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use tokio_util::io::ReaderStream;

/// GET /files/{key}
pub async fn get_file(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<Response> {
    serve_file(&state, &key, false).await
}

/// GET /files/{key}/{name}
///
/// The trailing name is cosmetic; a non-empty stored filename is sent as an attachment.
pub async fn get_named_file(
    State(state): State<AppState>,
    Path((key, _name)): Path<(String, String)>,
) -> ApiResult<Response> {
    serve_file(&state, &key, true).await
}

async fn serve_file(state: &AppState, key: &str, attachment: bool) -> ApiResult<Response> {
    let (record, reader) = state.service.get(key).await?;

    let mut headers = HeaderMap::new();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_str(&record.content_type)
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream")),
    );
    if attachment
        && !record.filename.is_empty()
        && let Ok(value) = HeaderValue::from_str(&content_disposition(&record.filename))
    {
        headers.insert(CONTENT_DISPOSITION, value);
    }

    let body = Body::from_stream(ReaderStream::new(reader));
    Ok((StatusCode::OK, headers, body).into_response())
}

/// `attachment; filename="..."` with quotes and control characters removed.
fn content_disposition(filename: &str) -> String {
    let safe: String = filename
        .chars()
        .filter(|c| !c.is_control() && *c != '"' && *c != '\\')
        .collect();
    format!("attachment; filename=\"{safe}\"")
}
