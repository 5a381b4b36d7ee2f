// handlers/public/health.rs - GET /ping and GET /health

use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, ERRNO_OK};
use crate::state::AppState;

/// GET /ping - process liveness, no store access
pub async fn ping() -> impl IntoResponse {
    Json(json!({ "errno": ERRNO_OK, "message": "pong" }))
}

/// GET /health - store connectivity
pub async fn health(State(state): State<AppState>) -> ApiResult<serde_json::Value> {
    state.health.check().await.map_err(ApiError::from)?;

    Ok(ApiResponse::success(json!({
        "status": "healthy",
        "environment": state.config.environment,
        "version": env!("CARGO_PKG_VERSION"),
    })))
}
