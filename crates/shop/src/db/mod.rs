//! Database operations for the shop `PostgreSQL` instance.
//!
//! # Database: `matchday_shop`
//!
//! One durable store per entity type; there is no secondary backend.
//!
//! ## Tables
//!
//! - `users` - Accounts, roles, and the derived wallet balance cache
//! - `sessions` - Tower-sessions storage
//! - `products` - Catalog
//! - `carts` / `cart_items` - Durable carts with a revision counter
//! - `orders` / `order_items` - Checkout snapshots
//! - `wallet_transactions` - Append-only wallet ledger
//!
//! # Migrations
//!
//! Migrations are stored in `crates/shop/migrations/` and run via:
//! ```bash
//! cargo run -p matchday-cli -- migrate
//! ```

pub mod carts;
pub mod orders;
pub mod products;
pub mod users;
pub mod wallet;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

/// Errors from repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Underlying database failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The requested row does not exist.
    #[error("not found")]
    NotFound,

    /// A uniqueness or concurrency constraint was violated.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A stored value failed domain validation on the way out.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

impl RepositoryError {
    /// Whether this error is a unique-constraint violation.
    ///
    /// Used by the wallet service to retry reference-id collisions.
    #[must_use]
    pub const fn is_unique_violation(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Map a sqlx error, converting unique violations into `Conflict`.
pub(crate) fn map_unique_violation(e: sqlx::Error, message: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(message.to_owned());
    }
    RepositoryError::Database(e)
}
