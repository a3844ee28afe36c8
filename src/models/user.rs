use serde::{Deserialize, Serialize};

/// One entry of the users file. Field names match the on-disk format.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserRecord {
    pub username: String,

    /// Argon2 PHC string.
    pub password: String,

    #[serde(default)]
    pub blocked: bool,
}

impl UserRecord {
    #[must_use]
    pub const fn new(username: String, password_hash: String) -> Self {
        Self {
            username,
            password: password_hash,
            blocked: false,
        }
    }
}

/// What the admin panel sees of a user. The hash never leaves the store.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UserSummary {
    pub username: String,
    pub blocked: bool,
}

impl From<UserRecord> for UserSummary {
    fn from(record: UserRecord) -> Self {
        Self {
            username: record.username,
            blocked: record.blocked,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

/// An authenticated identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Account {
    /// The configured administrator. Exists only in config, never in the users file.
    Administrator { username: String },

    Member(UserRecord),
}

impl Account {
    #[must_use]
    pub fn username(&self) -> &str {
        match self {
            Self::Administrator { username } => username,
            Self::Member(record) => &record.username,
        }
    }

    #[must_use]
    pub const fn role(&self) -> Role {
        match self {
            Self::Administrator { .. } => Role::Admin,
            Self::Member(_) => Role::User,
        }
    }

    #[must_use]
    pub fn session_user(&self) -> SessionUser {
        SessionUser {
            username: self.username().to_string(),
            role: self.role(),
        }
    }
}

/// Identity stored in the server-side session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionUser {
    pub username: String,
    pub role: Role,
}

impl SessionUser {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
