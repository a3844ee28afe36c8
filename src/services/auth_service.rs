//! Domain service for registration and login.

use thiserror::Error;

use crate::models::Account;

/// Errors specific to account operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Username and password are required")]
    MissingCredentials,

    #[error("Username is already registered")]
    UsernameTaken,

    /// Unknown username and wrong password share this variant.
    #[error("User not found or wrong password")]
    InvalidCredentials,

    #[error("Account is blocked")]
    Blocked,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(format!("{err:#}"))
    }
}

/// Domain service trait for accounts.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Creates an unblocked member account.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MissingCredentials`] for empty fields and
    /// [`AuthError::UsernameTaken`] when the name exists (including the admin name).
    async fn register(&self, username: &str, password: &str) -> Result<(), AuthError>;

    /// Resolves credentials to an account.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for unknown users and wrong
    /// passwords alike, and [`AuthError::Blocked`] only after the password matched.
    async fn login(&self, username: &str, password: &str) -> Result<Account, AuthError>;
}
