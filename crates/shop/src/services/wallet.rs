//! Wallet service.
//!
//! Credits and debits run inside one database transaction: row-lock the user,
//! compute the new balance, write the balance cache, append the ledger entry.
//! Either everything lands or nothing does, so the cached balance and the
//! ledger-derived balance always agree.

use sqlx::{Acquire, PgConnection, PgPool};
use thiserror::Error;

use matchday_core::{
    Money, MoneyError, OrderId, ReferenceId, TransactionType, UserId, WalletStatus,
};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::db::wallet::{NewEntry, WalletRepository};
use crate::models::{WalletSnapshot, WalletSummary, WalletTransaction};

/// Smallest amount a single credit or debit may move.
const MIN_AMOUNT_RUPEES: i64 = 1;

/// Largest amount a single credit or debit may move.
const MAX_AMOUNT_RUPEES: i64 = 50_000;

/// Reference IDs carry a 4-digit random suffix, so collisions within one
/// millisecond are possible. Regenerate a few times before giving up.
const MAX_REFERENCE_ATTEMPTS: u32 = 5;

/// Errors that can occur during wallet operations.
#[derive(Debug, Error)]
pub enum WalletError {
    /// Amount was zero or negative.
    #[error("amount must be greater than zero")]
    AmountNotPositive,

    /// Amount below the per-transaction minimum.
    #[error("minimum amount is ₹{MIN_AMOUNT_RUPEES}")]
    BelowMinimum,

    /// Amount above the per-transaction ceiling.
    #[error("maximum amount is ₹{MAX_AMOUNT_RUPEES} per transaction")]
    AboveMaximum,

    /// The wallet is frozen; no credits or debits are allowed.
    #[error("wallet is frozen")]
    WalletFrozen,

    /// Debit larger than the current balance.
    #[error("insufficient wallet balance")]
    InsufficientFunds,

    /// The wallet owner does not exist.
    #[error("user not found")]
    UserNotFound,

    /// Could not find a free reference ID after several attempts.
    #[error("could not allocate a transaction reference")]
    ReferenceIdExhausted,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(RepositoryError),

    /// Monetary arithmetic failed.
    #[error("amount error: {0}")]
    Amount(#[from] MoneyError),
}

impl From<RepositoryError> for WalletError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => Self::UserNotFound,
            other => Self::Repository(other),
        }
    }
}

impl From<sqlx::Error> for WalletError {
    fn from(e: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(e))
    }
}

/// Wallet service.
pub struct WalletService<'a> {
    pool: &'a PgPool,
    users: UserRepository<'a>,
    wallet: WalletRepository<'a>,
}

impl<'a> WalletService<'a> {
    /// Create a new wallet service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            pool,
            users: UserRepository::new(pool),
            wallet: WalletRepository::new(pool),
        }
    }

    /// Read the cached balance alongside the ledger-derived balance.
    ///
    /// # Errors
    ///
    /// Returns `WalletError::UserNotFound` if the user doesn't exist.
    pub async fn balance(&self, user_id: UserId) -> Result<WalletSnapshot, WalletError> {
        let user = self
            .users
            .get_by_id(user_id)
            .await?
            .ok_or(WalletError::UserNotFound)?;

        let calculated_balance = self.wallet.calculated_balance(user_id).await?;

        Ok(WalletSnapshot {
            balance: user.wallet_balance,
            calculated_balance,
        })
    }

    /// Aggregate the ledger into totals and a count.
    ///
    /// # Errors
    ///
    /// Returns `WalletError::Repository` if a query fails.
    pub async fn summary(&self, user_id: UserId) -> Result<WalletSummary, WalletError> {
        Ok(self.wallet.summary(user_id).await?)
    }

    /// List the user's ledger entries, newest first.
    ///
    /// # Errors
    ///
    /// Returns `WalletError::Repository` if the query fails.
    pub async fn transactions(
        &self,
        user_id: UserId,
    ) -> Result<Vec<WalletTransaction>, WalletError> {
        Ok(self.wallet.list_for_user(user_id).await?)
    }

    /// Credit the wallet (top-up).
    ///
    /// # Errors
    ///
    /// Returns a validation error if the amount is outside the accepted range.
    /// Returns `WalletError::WalletFrozen` if the wallet is frozen.
    pub async fn add_funds(
        &self,
        user_id: UserId,
        amount: Money,
    ) -> Result<WalletTransaction, WalletError> {
        let mut tx = self.pool.begin().await?;
        let entry = Self::apply_in_tx(
            &mut tx,
            user_id,
            TransactionType::Credit,
            amount,
            "Wallet top-up",
            None,
        )
        .await?;
        tx.commit().await?;

        tracing::info!(
            user_id = %user_id,
            amount = %amount,
            reference_id = %entry.reference_id,
            "Wallet credited"
        );

        Ok(entry)
    }

    /// Apply a credit or debit inside an open transaction.
    ///
    /// Locks the user row for the rest of the transaction, writes the new
    /// cached balance, and appends the ledger entry. The reference ID is
    /// regenerated in a savepoint if it collides with an existing entry.
    ///
    /// Used directly by checkout so the debit commits atomically with the
    /// order and the stock decrement.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the amount is outside the accepted
    /// range; credits and debits share the same per-call limits.
    /// Returns `WalletError::UserNotFound` if the user doesn't exist.
    /// Returns `WalletError::WalletFrozen` if the wallet is frozen.
    /// Returns `WalletError::InsufficientFunds` if a debit exceeds the balance.
    pub async fn apply_in_tx(
        conn: &mut PgConnection,
        user_id: UserId,
        transaction_type: TransactionType,
        amount: Money,
        description: &str,
        order_id: Option<OrderId>,
    ) -> Result<WalletTransaction, WalletError> {
        validate_amount(amount)?;

        let (balance, status) = WalletRepository::lock_balance(&mut *conn, user_id).await?;

        if status == WalletStatus::Frozen {
            return Err(WalletError::WalletFrozen);
        }

        let balance_after = match transaction_type {
            TransactionType::Credit => balance.checked_add(amount)?,
            TransactionType::Debit => balance
                .checked_sub(amount)
                .map_err(|_| WalletError::InsufficientFunds)?,
        };

        WalletRepository::write_balance(&mut *conn, user_id, balance_after).await?;

        for _ in 0..MAX_REFERENCE_ATTEMPTS {
            let reference_id = generate_reference_id();
            let entry = NewEntry {
                user_id,
                amount,
                transaction_type,
                description,
                order_id,
                balance_after,
                reference_id: &reference_id,
            };

            let mut savepoint = (&mut *conn).begin().await?;
            match WalletRepository::append_entry(&mut savepoint, &entry).await {
                Ok(transaction) => {
                    savepoint.commit().await?;
                    return Ok(transaction);
                }
                Err(e) if e.is_unique_violation() => {
                    savepoint.rollback().await?;
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(WalletError::ReferenceIdExhausted)
    }
}

/// Validate a top-up or payment amount against the accepted range.
fn validate_amount(amount: Money) -> Result<(), WalletError> {
    if !amount.is_positive() {
        return Err(WalletError::AmountNotPositive);
    }
    if amount < Money::from_rupees(MIN_AMOUNT_RUPEES) {
        return Err(WalletError::BelowMinimum);
    }
    if amount > Money::from_rupees(MAX_AMOUNT_RUPEES) {
        return Err(WalletError::AboveMaximum);
    }
    Ok(())
}

/// Generate a fresh reference ID from the clock and a random suffix.
fn generate_reference_id() -> ReferenceId {
    let millis = u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or_default();
    ReferenceId::from_parts(millis, rand::random::<u16>())
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_amount_range() {
        assert!(validate_amount(Money::from_rupees(1)).is_ok());
        assert!(validate_amount(Money::from_rupees(50_000)).is_ok());

        assert!(matches!(
            validate_amount(Money::ZERO),
            Err(WalletError::AmountNotPositive)
        ));
        assert!(matches!(
            validate_amount(Money::from_decimal(Decimal::new(50, 2))),
            Err(WalletError::BelowMinimum)
        ));
        assert!(matches!(
            validate_amount(Money::from_rupees(50_001)),
            Err(WalletError::AboveMaximum)
        ));
    }

    #[test]
    fn test_generated_reference_parses() {
        let id = generate_reference_id();
        assert!(ReferenceId::parse(id.as_str()).is_ok());
    }

    #[test]
    fn test_insufficient_funds_message() {
        assert_eq!(
            WalletError::InsufficientFunds.to_string(),
            "insufficient wallet balance"
        );
    }
}
