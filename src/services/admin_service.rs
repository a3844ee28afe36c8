//! Domain service for the admin panel and the `users` CLI.

use thiserror::Error;

use crate::models::UserSummary;

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for AdminError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(format!("{err:#}"))
    }
}

#[async_trait::async_trait]
pub trait AdminService: Send + Sync {
    /// Every stored user except the administrator identity.
    async fn list_users(&self) -> Result<Vec<UserSummary>, AdminError>;

    /// # Errors
    ///
    /// Returns [`AdminError::UserNotFound`] when no user has that name.
    async fn set_blocked(&self, username: &str, blocked: bool) -> Result<(), AdminError>;

    /// Succeeds whether or not the user existed.
    async fn delete_user(&self, username: &str) -> Result<(), AdminError>;
}
