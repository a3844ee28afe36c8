use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post},
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tower_sessions::cookie::Key;

use crate::config::Config;
use crate::services::{AdminService, AuthService, SolveService};
use crate::state::SharedState;

pub mod auth;
mod error;
mod extract;
mod observability;
pub mod pages;
pub mod session;
mod solve;
mod types;
mod users;

pub use error::ApiError;
pub use extract::ApiJson;
pub use types::*;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub session_key: Key,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    #[must_use]
    pub fn auth_service(&self) -> &Arc<dyn AuthService> {
        &self.shared.auth_service
    }

    #[must_use]
    pub fn admin_service(&self) -> &Arc<dyn AdminService> {
        &self.shared.admin_service
    }

    #[must_use]
    pub fn solve_service(&self) -> &Arc<SolveService> {
        &self.shared.solve_service
    }
}

pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let session_key = session::derive_session_key(&shared.config.server.session_secret)?;

    Ok(Arc::new(AppState {
        shared,
        session_key,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    }))
}

pub fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config)?);
    create_app_state(shared, prometheus_handle)
}

pub fn router(state: Arc<AppState>) -> Router {
    let server = state.config().server.clone();

    let api_router: Router<Arc<AppState>> = Router::new()
        .merge(admin_routes())
        .merge(member_routes())
        .route("/session", get(auth::get_session))
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout));

    let page_router: Router<Arc<AppState>> = Router::new()
        .route("/", get(pages::index_page))
        .route("/index.html", get(pages::index_page))
        .route("/library.html", get(pages::library_page))
        .route("/admin.html", get(pages::admin_page))
        .route("/health", get(observability::health));

    let cors_layer = if server.cors_allowed_origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = server
            .cors_allowed_origins
            .iter()
            .filter_map(|s| s.parse().ok())
            .collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .merge(page_router)
        .fallback(pages::public_fallback)
        .layer(session::session_layer(&server, state.session_key.clone()))
        .layer(DefaultBodyLimit::max(server.body_limit_bytes))
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::security_headers_middleware))
        .layer(middleware::from_fn(observability::logging_middleware))
        .with_state(state)
}

/// Routes behind both gates: anonymous callers get 401, members 403.
fn admin_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users", get(users::list_users))
        .route("/users/block", post(users::block_user))
        .route("/users/{username}", delete(users::delete_user))
        .route("/metrics", get(observability::get_metrics))
        .route_layer(middleware::from_fn(auth::require_admin))
        .route_layer(middleware::from_fn(auth::require_login))
}

fn member_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/solve", post(solve::solve))
        .route_layer(middleware::from_fn(auth::require_login))
}
