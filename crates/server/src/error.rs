//! API error types and the JSON response envelope.

use crate::service::ServiceError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Every JSON body the API returns.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    /// Zero on success, a negative error code otherwise.
    pub code: i32,
    pub message: String,
    pub results: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Successful response carrying `results`.
    pub fn success(results: T) -> Json<Self> {
        Json(Self {
            ok: true,
            code: 0,
            message: String::new(),
            results: Some(results),
        })
    }
}

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("invalid multipart body: {message}")]
    Multipart { status: StatusCode, message: String },

    #[error("file not found in request")]
    MissingFile,

    #[error("file not found")]
    NotFound,

    #[error("Access token is missing or invalid")]
    Unauthorized,

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("invalid delete key")]
    InvalidDeleteKey,

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Get the numeric error code for this error.
    pub fn code(&self) -> i32 {
        match self {
            Self::BadRequest(_) | Self::Multipart { .. } => -1000,
            Self::MissingFile => -1001,
            Self::NotFound => -1004,
            Self::Unauthorized => -2000,
            Self::Forbidden(_) => -2001,
            Self::InvalidDeleteKey => -2002,
            Self::Internal(_) => -5000,
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::MissingFile => StatusCode::BAD_REQUEST,
            Self::Multipart { status, .. } => *status,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Unauthorized | Self::InvalidDeleteKey => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to clients. Internal details stay in the logs.
    fn public_message(&self) -> String {
        match self {
            Self::Internal(_) => "internal error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::NotFound(_) => Self::NotFound,
            ServiceError::Unauthorized => Self::InvalidDeleteKey,
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<axum::extract::multipart::MultipartError> for ApiError {
    fn from(e: axum::extract::multipart::MultipartError) -> Self {
        Self::Multipart {
            status: e.status(),
            message: e.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ApiResponse::<()> {
            ok: false,
            code: self.code(),
            message: self.public_message(),
            results: None,
        };
        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use stash_metadata::MetadataError;

    #[test]
    fn test_service_errors_map_to_codes() {
        let not_found: ApiError = ServiceError::NotFound("upload 1".to_string()).into();
        assert_eq!(not_found.code(), -1004);
        assert_eq!(not_found.status_code(), StatusCode::NOT_FOUND);

        let bad_secret: ApiError = ServiceError::Unauthorized.into();
        assert_eq!(bad_secret.code(), -2002);
        assert_eq!(bad_secret.status_code(), StatusCode::UNAUTHORIZED);

        let conflict: ApiError = ServiceError::Conflict("exhausted".to_string()).into();
        assert_eq!(conflict.code(), -5000);

        let db: ApiError =
            ServiceError::from(MetadataError::Config("broken".to_string())).into();
        assert_eq!(db.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_internal_details_are_not_exposed() {
        let err = ApiError::Internal("sqlite is on fire".to_string());
        assert_eq!(err.public_message(), "internal error");
        assert!(err.to_string().contains("sqlite is on fire"));
    }

    #[test]
    fn test_envelope_shape() {
        let Json(body) = ApiResponse::success(true);
        let json = serde_json::to_value(body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"ok": true, "code": 0, "message": "", "results": true})
        );
    }
}
