//! Server-side sessions: cookie settings, signing key, and the stored identity.

use argon2::Argon2;
use time::{Duration, OffsetDateTime};
use tower_sessions::{
    Expiry, MemoryStore, Session, SessionManagerLayer, cookie::Key, cookie::SameSite,
    service::SignedCookie,
};

use super::ApiError;
use crate::config::ServerConfig;
use crate::models::SessionUser;

pub const SESSION_COOKIE: &str = "chemsolve.sid";

const SESSION_USER_KEY: &str = "user";

/// Fixed salt: the same secret must yield the same key across restarts.
const SESSION_KEY_SALT: &[u8] = b"chemsolve.session-signing-key";

/// Stretch an arbitrary-length secret into the 64 bytes cookie signing needs.
pub fn derive_session_key(secret: &str) -> anyhow::Result<Key> {
    let mut bytes = [0u8; 64];
    Argon2::default()
        .hash_password_into(secret.as_bytes(), SESSION_KEY_SALT, &mut bytes)
        .map_err(|e| anyhow::anyhow!("Failed to derive session key: {e}"))?;
    Ok(Key::from(&bytes))
}

/// Sessions expire a fixed time after login; see [`establish`].
#[must_use]
pub fn session_layer(
    config: &ServerConfig,
    key: Key,
) -> SessionManagerLayer<MemoryStore, SignedCookie> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE)
        .with_secure(config.secure_cookies)
        .with_same_site(SameSite::Lax)
        .with_signed(key)
}

pub async fn current_user(session: &Session) -> Result<Option<SessionUser>, ApiError> {
    session
        .get::<SessionUser>(SESSION_USER_KEY)
        .await
        .map_err(|e| ApiError::internal(format!("Session error: {e}")))
}

/// Store the identity under a fresh session id. The session ends
/// `ttl_minutes` after this call, however active it is.
pub async fn establish(
    session: &Session,
    user: &SessionUser,
    ttl_minutes: i64,
) -> Result<(), ApiError> {
    session
        .cycle_id()
        .await
        .map_err(|e| ApiError::internal(format!("Failed to cycle session: {e}")))?;
    session.set_expiry(Some(Expiry::AtDateTime(
        OffsetDateTime::now_utc() + Duration::minutes(ttl_minutes),
    )));
    session
        .insert(SESSION_USER_KEY, user)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))
}

pub async fn destroy(session: &Session) -> Result<(), ApiError> {
    session
        .flush()
        .await
        .map_err(|e| ApiError::internal(format!("Failed to destroy session: {e}")))
}
