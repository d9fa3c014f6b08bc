use axum::extract::State;
use serde_json::{json, Value};

use crate::database::DatabaseManager;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /health, GET /api/v1/health - database connectivity check
pub async fn health(State(state): State<AppState>) -> ApiResult<Value> {
    if let Err(e) = DatabaseManager::health_check(&state.pool).await {
        tracing::warn!("health check failed: {}", e);
        return Err(ApiError::service_unavailable("Database unavailable"));
    }
    Ok(ApiResponse::success(json!({ "status": "ok" })))
}
