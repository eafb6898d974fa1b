//! HTTP server for the stash file upload service.
//!
//! This crate provides:
//! - [`UploadService`], which keeps upload records and blobs consistent
//! - Upload, download and delete endpoints
//! - Bearer token authentication
//! - ShareX uploader definitions for registered users

pub mod auth;
pub mod error;
pub mod handlers;
pub mod links;
pub mod routes;
pub mod service;
pub mod sharex;
pub mod state;

pub use auth::{AuthenticatedUser, TraceId};
pub use error::{ApiError, ApiResponse, ApiResult};
pub use links::Links;
pub use routes::create_router;
pub use service::{ServiceError, ServiceResult, UploadService};
pub use sharex::ShareXConfig;
pub use state::AppState;
