//! User domain types.

use chrono::{DateTime, Utc};

use matchday_core::{Email, Money, Role, UserId, WalletStatus};

/// A shop user (domain type).
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// Display name shown on orders.
    pub display_name: String,
    /// Account role.
    pub role: Role,
    /// Derived wallet balance cache.
    ///
    /// Written only inside wallet ledger transactions; reads that need a
    /// verified figure recompute from the ledger instead.
    pub wallet_balance: Money,
    /// Whether the wallet accepts operations.
    pub wallet_status: WalletStatus,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}
