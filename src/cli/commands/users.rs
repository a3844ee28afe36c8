//! User management command handlers

use anyhow::Context;

use crate::config::Config;
use crate::state::SharedState;

pub async fn cmd_users_list(config: &Config) -> anyhow::Result<()> {
    let state = SharedState::new(config.clone())?;
    let users = state.admin_service.list_users().await?;

    if users.is_empty() {
        println!("No registered users.");
        return Ok(());
    }

    println!("Registered users ({} total)", users.len());
    println!("{:-<40}", "");
    for user in users {
        let status = if user.blocked { "blocked" } else { "active" };
        println!("{:<30} {}", user.username, status);
    }

    Ok(())
}

pub async fn cmd_users_set_blocked(
    config: &Config,
    username: &str,
    blocked: bool,
) -> anyhow::Result<()> {
    let state = SharedState::new(config.clone())?;

    state
        .admin_service
        .set_blocked(username, blocked)
        .await
        .with_context(|| format!("Failed to update {username}"))?;

    if blocked {
        println!("✓ Blocked {username}");
    } else {
        println!("✓ Unblocked {username}");
    }
    Ok(())
}

pub async fn cmd_users_delete(config: &Config, username: &str) -> anyhow::Result<()> {
    let state = SharedState::new(config.clone())?;
    state.admin_service.delete_user(username).await?;
    println!("✓ Deleted {username}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::AdminError;

    fn config() -> Config {
        let mut config = Config::default();
        config.general.users_path = std::env::temp_dir()
            .join(format!("chemsolve-cli-test-{}", uuid::Uuid::new_v4()))
            .join("users.json")
            .display()
            .to_string();
        config
    }

    #[tokio::test]
    async fn test_block_unknown_user_fails() {
        let err = cmd_users_set_blocked(&config(), "ghost", true)
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AdminError>(),
            Some(AdminError::UserNotFound(name)) if name == "ghost"
        ));
    }

    #[tokio::test]
    async fn test_delete_unknown_user_succeeds() {
        assert!(cmd_users_delete(&config(), "ghost").await.is_ok());
    }
}
