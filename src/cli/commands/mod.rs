mod init;
mod users;

pub use init::cmd_init;
pub use users::{cmd_users_delete, cmd_users_list, cmd_users_set_blocked};
