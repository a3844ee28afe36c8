use anyhow::Result;
use async_trait::async_trait;

use crate::models::UserRecord;

pub mod repositories;

pub use repositories::user::{JsonUserRepository, hash_password, verify_password};

/// Storage for registered users, keyed by username.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<UserRecord>>;

    async fn find(&self, username: &str) -> Result<Option<UserRecord>>;

    /// Returns `false` without writing when the username is already taken.
    async fn insert(&self, record: UserRecord) -> Result<bool>;

    /// Returns `false` when no user has that name.
    async fn update_blocked(&self, username: &str, blocked: bool) -> Result<bool>;

    /// Returns whether a record was removed.
    async fn delete(&self, username: &str) -> Result<bool>;
}
