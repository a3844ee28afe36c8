//! `UserRepository`-backed implementation of the `AuthService` trait.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::task;
use tracing::info;

use crate::config::SecurityConfig;
use crate::db::{self, UserRepository};
use crate::models::{Account, UserRecord};
use crate::services::auth_service::{AuthError, AuthService};

pub struct DefaultAuthService {
    users: Arc<dyn UserRepository>,
    security: SecurityConfig,
}

impl DefaultAuthService {
    #[must_use]
    pub fn new(users: Arc<dyn UserRepository>, security: SecurityConfig) -> Self {
        Self { users, security }
    }

    fn is_admin_credential(&self, username: &str, password: &str) -> bool {
        username == self.security.admin_username && password == self.security.admin_password
    }
}

#[async_trait]
impl AuthService for DefaultAuthService {
    async fn register(&self, username: &str, password: &str) -> Result<(), AuthError> {
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        if username == self.security.admin_username {
            return Err(AuthError::UsernameTaken);
        }

        // Cheap pre-check so a taken name doesn't cost a hash.
        if self.users.find(username).await?.is_some() {
            return Err(AuthError::UsernameTaken);
        }

        // Argon2 is CPU-bound; keep it off the async workers.
        let password = password.to_string();
        let security = self.security.clone();
        let hash = task::spawn_blocking(move || db::hash_password(&password, &security))
            .await
            .map_err(|e| AuthError::Internal(format!("Password hashing task panicked: {e}")))??;

        if !self
            .users
            .insert(UserRecord::new(username.to_string(), hash))
            .await?
        {
            return Err(AuthError::UsernameTaken);
        }

        info!(username, "User registered");
        Ok(())
    }

    async fn login(&self, username: &str, password: &str) -> Result<Account, AuthError> {
        if self.is_admin_credential(username, password) {
            return Ok(Account::Administrator {
                username: username.to_string(),
            });
        }

        let Some(user) = self.users.find(username).await? else {
            return Err(AuthError::InvalidCredentials);
        };

        let password = password.to_string();
        let password_hash = user.password.clone();
        let matches =
            task::spawn_blocking(move || db::verify_password(&password, &password_hash))
                .await
                .map_err(|e| {
                    AuthError::Internal(format!("Password verification task panicked: {e}"))
                })??;

        if !matches {
            return Err(AuthError::InvalidCredentials);
        }

        if user.blocked {
            return Err(AuthError::Blocked);
        }

        Ok(Account::Member(user))
    }
}
