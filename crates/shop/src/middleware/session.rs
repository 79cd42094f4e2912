//! Session middleware configuration.
//!
//! Sets up `PostgreSQL`-backed sessions using tower-sessions. The session
//! holds at most two values: the logged-in user and the durable cart ID.

use secrecy::ExposeSecret;
use sqlx::PgPool;
use tower_sessions::{Expiry, Session, SessionManagerLayer, cookie::Key, service::SignedCookie};
use tower_sessions_sqlx_store::PostgresStore;

use matchday_core::CartId;

use crate::config::ShopConfig;
use crate::models::session_keys;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "md_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Create the session layer with `PostgreSQL` store.
///
/// # Arguments
///
/// * `pool` - `PostgreSQL` connection pool
/// * `config` - Shop configuration (cookie signing key and HTTPS check)
#[must_use]
pub fn create_session_layer(
    pool: &PgPool,
    config: &ShopConfig,
) -> SessionManagerLayer<PostgresStore, SignedCookie> {
    // Note: The sessions table must be created via migration
    let store = PostgresStore::new(pool.clone());

    let is_secure = config.base_url.starts_with("https://");

    // Config validation guarantees the secret is at least 32 bytes
    let key = Key::derive_from(config.session_secret.expose_secret().as_bytes());

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(is_secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        .with_signed(key)
}

/// Read the durable cart ID from the session.
///
/// # Errors
///
/// Returns an error if the session store cannot be read.
pub async fn cart_id(session: &Session) -> Result<Option<CartId>, tower_sessions::session::Error> {
    session.get(session_keys::CART_ID).await
}

/// Store the durable cart ID in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_cart_id(
    session: &Session,
    cart_id: CartId,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CART_ID, cart_id).await
}
