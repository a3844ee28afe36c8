use axum::{
    Json,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tower_sessions::Session;

use super::session::{self, current_user};
use super::{
    ApiError, ApiJson, AppState, CredentialsRequest, MessageResponse, RoleResponse,
    SessionResponse,
};
use crate::services::AuthError;

// ============================================================================
// Middleware
// ============================================================================

/// Rejects requests without a logged-in session. The session user is made
/// available to handlers as an `Extension<SessionUser>`, and is attached to
/// the response so the request log can name it.
pub async fn require_login(
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(user) = current_user(&session).await? else {
        return Err(ApiError::login_required());
    };

    request.extensions_mut().insert(user.clone());
    let mut response = next.run(request).await;
    response.extensions_mut().insert(user);
    Ok(response)
}

/// Rejects requests whose session role is not admin. Stands on its own, so
/// an anonymous request that reaches it is also refused with 403.
pub async fn require_admin(
    session: Session,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    match current_user(&session).await? {
        Some(user) if user.is_admin() => Ok(next.run(request).await),
        _ => Err(ApiError::admin_required()),
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/session
pub async fn get_session(session: Session) -> Result<Json<SessionResponse>, ApiError> {
    let user = current_user(&session).await?;
    Ok(Json(SessionResponse {
        logged_in: user.is_some(),
        user,
    }))
}

/// POST /api/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<CredentialsRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    state
        .auth_service()
        .register(
            payload.username.as_deref().unwrap_or_default(),
            payload.password.as_deref().unwrap_or_default(),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Registration successful.")),
    ))
}

/// POST /api/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    ApiJson(payload): ApiJson<CredentialsRequest>,
) -> Result<Json<RoleResponse>, ApiError> {
    let username = payload.username.unwrap_or_default();
    let password = payload.password.unwrap_or_default();

    let result = state.auth_service().login(&username, &password).await;

    let outcome = match &result {
        Ok(_) => "success",
        Err(AuthError::InvalidCredentials) => "invalid_credentials",
        Err(AuthError::Blocked) => "blocked",
        Err(_) => "error",
    };
    metrics::counter!("auth_logins_total", "outcome" => outcome).increment(1);

    let account = result.inspect_err(|e| {
        tracing::info!(username = %username, reason = %e, "Login rejected");
    })?;

    let user = account.session_user();
    session::establish(&session, &user, state.config().server.session_ttl_minutes).await?;

    tracing::info!(username = %user.username, role = ?user.role, "User logged in");
    Ok(Json(RoleResponse { role: user.role }))
}

/// POST /api/logout
pub async fn logout(session: Session) -> Result<Json<MessageResponse>, ApiError> {
    session::destroy(&session).await?;
    Ok(Json(MessageResponse::new("Logged out successfully.")))
}
