use std::sync::Arc;

use crate::clients::gemini::GeminiClient;
use crate::config::Config;
use crate::db::{JsonUserRepository, UserRepository};
use crate::services::{
    AdminService, AuthService, DefaultAdminService, DefaultAuthService, SolveService,
};

/// Services shared by the web server and the CLI.
#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub auth_service: Arc<dyn AuthService>,

    pub admin_service: Arc<dyn AdminService>,

    pub solve_service: Arc<SolveService>,
}

impl SharedState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let users: Arc<dyn UserRepository> =
            Arc::new(JsonUserRepository::new(&config.general.users_path));
        Self::with_repository(config, users)
    }

    /// Wires the services around an existing repository.
    pub fn with_repository(config: Config, users: Arc<dyn UserRepository>) -> anyhow::Result<Self> {
        let auth_service = Arc::new(DefaultAuthService::new(
            users.clone(),
            config.security.clone(),
        ));

        let admin_service = Arc::new(DefaultAdminService::new(
            users,
            config.security.admin_username.clone(),
        ));

        let gemini = GeminiClient::new(&config.upstream)?;
        let solve_service = Arc::new(SolveService::new(gemini, config.upstream.search_grounding));

        Ok(Self {
            config: Arc::new(config),
            auth_service,
            admin_service,
            solve_service,
        })
    }
}
