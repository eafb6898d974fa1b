//! Health check.

use crate::error::{ApiResponse, ApiResult};
use crate::state::AppState;
use axum::Json;
use axum::extract::State;

/// GET /health
pub async fn health_check(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<&'static str>>> {
    state.service.health_check().await?;
    Ok(ApiResponse::success("ok"))
}
