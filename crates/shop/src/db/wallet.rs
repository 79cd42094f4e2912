//! Wallet ledger repository.
//!
//! The ledger is append-only. Balance mutations happen only inside a
//! transaction that row-locks the owning user (`SELECT ... FOR UPDATE`),
//! writes the new balance cache, and appends the ledger entry with its
//! `balance_after` in one commit. The lock serializes concurrent wallet
//! operations per user, so `balance_after` values always chain.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use matchday_core::{
    Money, OrderId, ReferenceId, TransactionId, TransactionStatus, TransactionType, UserId,
    WalletStatus,
};

use super::{RepositoryError, map_unique_violation};
use crate::models::{WalletSummary, WalletTransaction};

#[derive(sqlx::FromRow)]
struct TransactionRow {
    id: TransactionId,
    user_id: UserId,
    amount: Money,
    transaction_type: TransactionType,
    description: String,
    order_id: Option<OrderId>,
    balance_after: Money,
    reference_id: ReferenceId,
    status: TransactionStatus,
    created_at: DateTime<Utc>,
}

impl From<TransactionRow> for WalletTransaction {
    fn from(row: TransactionRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            amount: row.amount,
            transaction_type: row.transaction_type,
            description: row.description,
            order_id: row.order_id,
            balance_after: row.balance_after,
            reference_id: row.reference_id,
            status: row.status,
            created_at: row.created_at,
        }
    }
}

const TRANSACTION_COLUMNS: &str = "id, user_id, amount, transaction_type, description, order_id, \
                                   balance_after, reference_id, status, created_at";

/// A ledger entry ready to be appended inside a wallet transaction.
pub struct NewEntry<'s> {
    pub user_id: UserId,
    pub amount: Money,
    pub transaction_type: TransactionType,
    pub description: &'s str,
    pub order_id: Option<OrderId>,
    pub balance_after: Money,
    pub reference_id: &'s ReferenceId,
}

/// Repository for the wallet balance cache and ledger.
pub struct WalletRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> WalletRepository<'a> {
    /// Create a new wallet repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Row-lock a user's wallet and return the cached balance and status.
    ///
    /// Must run inside an open transaction; the lock is held until commit.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn lock_balance(
        conn: &mut PgConnection,
        user_id: UserId,
    ) -> Result<(Money, WalletStatus), RepositoryError> {
        let row: Option<(Money, WalletStatus)> = sqlx::query_as(
            "SELECT wallet_balance, wallet_status FROM users WHERE id = $1 FOR UPDATE",
        )
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await?;

        row.ok_or(RepositoryError::NotFound)
    }

    /// Write the new cached balance for a row-locked user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn write_balance(
        conn: &mut PgConnection,
        user_id: UserId,
        new_balance: Money,
    ) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE users SET wallet_balance = $1, updated_at = now() WHERE id = $2")
            .bind(new_balance)
            .bind(user_id)
            .execute(conn)
            .await?;

        Ok(())
    }

    /// Append a completed ledger entry inside an open transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` on a reference-id collision, which
    /// the caller handles by regenerating and retrying.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn append_entry(
        conn: &mut PgConnection,
        entry: &NewEntry<'_>,
    ) -> Result<WalletTransaction, RepositoryError> {
        let row: TransactionRow = sqlx::query_as(&format!(
            "INSERT INTO wallet_transactions \
                 (user_id, amount, transaction_type, description, order_id, balance_after, \
                  reference_id, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {TRANSACTION_COLUMNS}"
        ))
        .bind(entry.user_id)
        .bind(entry.amount)
        .bind(entry.transaction_type)
        .bind(entry.description)
        .bind(entry.order_id)
        .bind(entry.balance_after)
        .bind(entry.reference_id)
        .bind(TransactionStatus::Completed)
        .fetch_one(conn)
        .await
        .map_err(|e| map_unique_violation(e, "reference id already exists"))?;

        Ok(WalletTransaction::from(row))
    }

    /// Sum the ledger for a user: completed credits minus completed debits.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if debits exceed credits.
    pub async fn calculated_balance(&self, user_id: UserId) -> Result<Money, RepositoryError> {
        let (credits, debits) = self.ledger_totals(user_id).await?;

        credits.checked_sub(debits).map_err(|_| {
            RepositoryError::DataCorruption(format!("ledger for user {user_id} sums negative"))
        })
    }

    /// Aggregate the ledger into totals and a count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn summary(&self, user_id: UserId) -> Result<WalletSummary, RepositoryError> {
        let (total_credits, total_debits) = self.ledger_totals(user_id).await?;

        let (transaction_count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM wallet_transactions WHERE user_id = $1 AND status = $2",
        )
        .bind(user_id)
        .bind(TransactionStatus::Completed)
        .fetch_one(self.pool)
        .await?;

        Ok(WalletSummary {
            total_credits,
            total_debits,
            transaction_count,
        })
    }

    /// List a user's ledger entries, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<WalletTransaction>, RepositoryError> {
        let rows: Vec<TransactionRow> = sqlx::query_as(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM wallet_transactions \
             WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(WalletTransaction::from).collect())
    }

    async fn ledger_totals(&self, user_id: UserId) -> Result<(Money, Money), RepositoryError> {
        let (credits, debits): (Money, Money) = sqlx::query_as(
            "SELECT COALESCE(SUM(amount) FILTER (WHERE transaction_type = $2), 0), \
                    COALESCE(SUM(amount) FILTER (WHERE transaction_type = $3), 0) \
             FROM wallet_transactions WHERE user_id = $1 AND status = $4",
        )
        .bind(user_id)
        .bind(TransactionType::Credit)
        .bind(TransactionType::Debit)
        .bind(TransactionStatus::Completed)
        .fetch_one(self.pool)
        .await?;

        Ok((credits, debits))
    }
}
