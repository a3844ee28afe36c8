pub mod user;

pub use user::{Account, Role, SessionUser, UserRecord, UserSummary};
