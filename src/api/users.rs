use axum::{
    Json,
    extract::{Path, State},
};
use std::sync::Arc;

use super::{ApiError, ApiJson, AppState, BlockRequest, MessageResponse};
use crate::models::UserSummary;

/// GET /api/users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<UserSummary>>, ApiError> {
    let users = state.admin_service().list_users().await?;
    Ok(Json(users))
}

/// DELETE /api/users/{username}
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.admin_service().delete_user(&username).await?;
    Ok(Json(MessageResponse::new("User deleted.")))
}

/// POST /api/users/block
pub async fn block_user(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<BlockRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .admin_service()
        .set_blocked(&payload.username, payload.blocked)
        .await?;

    let message = if payload.blocked {
        "User blocked."
    } else {
        "User unblocked."
    };
    Ok(Json(MessageResponse::new(message)))
}
