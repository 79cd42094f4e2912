//! Wallet domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use matchday_core::{
    Money, OrderId, ReferenceId, TransactionId, TransactionStatus, TransactionType, UserId,
};

/// An append-only wallet ledger entry.
///
/// `balance_after` is computed inside the same database transaction that
/// writes the user's balance cache, so consecutive entries always chain:
/// entry N's `balance_after` equals entry N-1's plus or minus `amount`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletTransaction {
    pub id: TransactionId,
    pub user_id: UserId,
    /// Always positive; direction comes from `transaction_type`.
    pub amount: Money,
    pub transaction_type: TransactionType,
    pub description: String,
    /// Present when the entry was produced by a checkout debit.
    pub order_id: Option<OrderId>,
    /// Balance after applying this entry.
    pub balance_after: Money,
    pub reference_id: ReferenceId,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
}

/// Balance read: the cached figure plus the ledger-derived figure.
///
/// The wire contract reports both; under the transactional design they agree.
#[derive(Debug, Clone, Copy)]
pub struct WalletSnapshot {
    /// Denormalized balance from the user row.
    pub balance: Money,
    /// Credits minus debits summed from the ledger.
    pub calculated_balance: Money,
}

/// Aggregated ledger view.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletSummary {
    pub total_credits: Money,
    pub total_debits: Money,
    pub transaction_count: i64,
}
