use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

use super::{ErrorResponse, MessageResponse};
use crate::clients::gemini::UpstreamError;
use crate::services::{AdminError, AuthError, SolveError};

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),

    ValidationError(String),

    Unauthorized(String),

    Forbidden(String),

    /// Upstream answered with an error status; relayed as-is.
    Upstream { status: u16, body: String },

    /// Upstream could not be reached or its answer could not be read.
    UpstreamTransport(String),

    InternalError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
            Self::ValidationError(msg) => write!(f, "Validation error: {msg}"),
            Self::Unauthorized(msg) => write!(f, "Unauthorized: {msg}"),
            Self::Forbidden(msg) => write!(f, "Forbidden: {msg}"),
            Self::Upstream { status, body } => write!(f, "Upstream error {status}: {body}"),
            Self::UpstreamTransport(msg) => write!(f, "Upstream transport error: {msg}"),
            Self::InternalError(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = |status: StatusCode, msg: String| {
            (status, Json(MessageResponse::new(msg))).into_response()
        };

        match self {
            Self::NotFound(msg) => message(StatusCode::NOT_FOUND, msg),
            Self::ValidationError(msg) => message(StatusCode::BAD_REQUEST, msg),
            Self::Unauthorized(msg) => message(StatusCode::UNAUTHORIZED, msg),
            Self::Forbidden(msg) => message(StatusCode::FORBIDDEN, msg),
            Self::Upstream { status, body } => {
                let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
                let envelope = ErrorResponse::new(format!("Upstream API error: {body}"));
                (status, Json(envelope)).into_response()
            }
            Self::UpstreamTransport(msg) => {
                tracing::error!("Upstream request failed: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse::new(msg))).into_response()
            }
            Self::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                message(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred.".to_string(),
                )
            }
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::InternalError(format!("{err:#}"))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::ValidationError(rejection.body_text())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingCredentials => Self::validation("Username and password are required."),
            AuthError::UsernameTaken => Self::validation("This user is already registered."),
            AuthError::InvalidCredentials => {
                Self::Unauthorized("User not found or wrong password.".to_string())
            }
            AuthError::Blocked => Self::Forbidden("Your account has been blocked.".to_string()),
            AuthError::Internal(msg) => Self::InternalError(msg),
        }
    }
}

impl From<AdminError> for ApiError {
    fn from(err: AdminError) -> Self {
        match err {
            AdminError::UserNotFound(_) => Self::NotFound("User not found.".to_string()),
            AdminError::Internal(msg) => Self::InternalError(msg),
        }
    }
}

impl From<SolveError> for ApiError {
    fn from(err: SolveError) -> Self {
        match err {
            SolveError::EmptyParts => Self::validation("At least one part is required."),
            SolveError::Upstream(UpstreamError::Status { status, body }) => {
                Self::Upstream { status, body }
            }
            SolveError::Upstream(UpstreamError::Transport(msg)) => Self::UpstreamTransport(msg),
        }
    }
}

impl ApiError {
    #[must_use]
    pub fn login_required() -> Self {
        Self::Unauthorized("Please log in.".to_string())
    }

    #[must_use]
    pub fn admin_required() -> Self {
        Self::Forbidden("You are not allowed to perform this action.".to_string())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::InternalError(msg.into())
    }
}
