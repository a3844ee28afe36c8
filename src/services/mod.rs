pub mod admin_service;
pub mod admin_service_impl;
pub mod auth_service;
pub mod auth_service_impl;
pub mod solve;

pub use admin_service::{AdminError, AdminService};
pub use admin_service_impl::DefaultAdminService;
pub use auth_service::{AuthError, AuthService};
pub use auth_service_impl::DefaultAuthService;
pub use solve::{SolveError, SolveService};
