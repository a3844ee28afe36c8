use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::db::UserRepository;
use crate::models::UserSummary;
use crate::services::admin_service::{AdminError, AdminService};

pub struct DefaultAdminService {
    users: Arc<dyn UserRepository>,
    admin_username: String,
}

impl DefaultAdminService {
    #[must_use]
    pub fn new(users: Arc<dyn UserRepository>, admin_username: impl Into<String>) -> Self {
        Self {
            users,
            admin_username: admin_username.into(),
        }
    }
}

#[async_trait]
impl AdminService for DefaultAdminService {
    async fn list_users(&self) -> Result<Vec<UserSummary>, AdminError> {
        let users = self.users.list().await?;
        Ok(users
            .into_iter()
            .filter(|u| u.username != self.admin_username)
            .map(UserSummary::from)
            .collect())
    }

    async fn set_blocked(&self, username: &str, blocked: bool) -> Result<(), AdminError> {
        if !self.users.update_blocked(username, blocked).await? {
            return Err(AdminError::UserNotFound(username.to_string()));
        }

        info!(username, blocked, "User block state changed");
        Ok(())
    }

    async fn delete_user(&self, username: &str) -> Result<(), AdminError> {
        let removed = self.users.delete(username).await?;
        info!(username, removed, "User delete requested");
        Ok(())
    }
}
