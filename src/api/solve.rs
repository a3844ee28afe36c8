use axum::{Extension, Json, extract::State};
use serde_json::Value;
use std::sync::Arc;

use super::{ApiError, ApiJson, AppState, SolveRequest};
use crate::models::SessionUser;

/// POST /api/solve
/// Upstream's JSON comes back unmodified on success.
pub async fn solve(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    ApiJson(payload): ApiJson<SolveRequest>,
) -> Result<Json<Value>, ApiError> {
    let answer = state
        .solve_service()
        .solve(&user.username, payload.parts)
        .await?;
    Ok(Json(answer))
}
