use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::debug;

use crate::config::SecurityConfig;
use crate::db::UserRepository;
use crate::models::UserRecord;

/// Users kept as one pretty-printed JSON array, rewritten in full on every
/// mutation.
///
/// Every read-modify-write holds `write_lock`, and the file is replaced via
/// rename, so readers never observe a half-written file and concurrent
/// writers cannot drop each other's changes.
pub struct JsonUserRepository {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonUserRepository {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<Vec<UserRecord>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read users file: {}", self.path.display()));
            }
        };

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse users file: {}", self.path.display()))
    }

    async fn write_all(&self, users: &[UserRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let content = serde_json::to_string_pretty(users)?;
        let tmp_path = self.path.with_extension("json.tmp");

        tokio::fs::write(&tmp_path, content)
            .await
            .with_context(|| format!("Failed to write users file: {}", tmp_path.display()))?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .with_context(|| format!("Failed to replace users file: {}", self.path.display()))?;

        debug!(count = users.len(), path = %self.path.display(), "Users file written");
        Ok(())
    }
}

#[async_trait]
impl UserRepository for JsonUserRepository {
    async fn list(&self) -> Result<Vec<UserRecord>> {
        self.read_all().await
    }

    async fn find(&self, username: &str) -> Result<Option<UserRecord>> {
        let users = self.read_all().await?;
        Ok(users.into_iter().find(|u| u.username == username))
    }

    async fn insert(&self, record: UserRecord) -> Result<bool> {
        let _guard = self.write_lock.lock().await;

        let mut users = self.read_all().await?;
        if users.iter().any(|u| u.username == record.username) {
            return Ok(false);
        }

        users.push(record);
        self.write_all(&users).await?;
        Ok(true)
    }

    async fn update_blocked(&self, username: &str, blocked: bool) -> Result<bool> {
        let _guard = self.write_lock.lock().await;

        let mut users = self.read_all().await?;
        let Some(user) = users.iter_mut().find(|u| u.username == username) else {
            return Ok(false);
        };

        user.blocked = blocked;
        self.write_all(&users).await?;
        Ok(true)
    }

    async fn delete(&self, username: &str) -> Result<bool> {
        let _guard = self.write_lock.lock().await;

        let mut users = self.read_all().await?;
        let before = users.len();
        users.retain(|u| u.username != username);

        // Rewritten even when nothing matched, like every other mutation.
        self.write_all(&users).await?;
        Ok(users.len() != before)
    }
}

/// Hash a password using Argon2id with the configured cost and a fresh random salt.
pub fn hash_password(password: &str, config: &SecurityConfig) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let params = Params::new(
        config.argon2_memory_cost_kib,
        config.argon2_time_cost,
        config.argon2_parallelism,
        None,
    )
    .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

/// Check a password against a stored PHC string. The cost parameters are read
/// from the hash itself.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
