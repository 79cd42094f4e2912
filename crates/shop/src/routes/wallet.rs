//! Wallet route handlers.
//!
//! All endpoints require a logged-in user. The balance endpoint reports both
//! the cached balance and the ledger-derived figure; they agree because every
//! wallet mutation writes both inside one transaction.

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use matchday_core::Money;

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::services::wallet::WalletService;
use crate::state::AppState;

/// Top-up request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddFundsRequest {
    pub amount: Money,
    /// Cosmetic; funding source integration is out of scope.
    #[allow(dead_code)]
    pub payment_method: Option<String>,
}

/// Report the cached and ledger-derived balances.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn balance(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Value>> {
    let snapshot = WalletService::new(state.pool()).balance(user.id).await?;

    Ok(Json(json!({
        "success": true,
        "balance": snapshot.balance,
        "calculatedBalance": snapshot.calculated_balance,
        "formatted": snapshot.balance.formatted(),
    })))
}

/// Credit the wallet.
#[instrument(skip(state, user, body), fields(user_id = %user.id))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<AddFundsRequest>,
) -> Result<Json<Value>> {
    let transaction = WalletService::new(state.pool())
        .add_funds(user.id, body.amount)
        .await?;

    Ok(Json(json!({
        "success": true,
        "newBalance": transaction.balance_after,
        "formatted": transaction.balance_after.formatted(),
        "transaction": transaction,
    })))
}

/// List the user's ledger entries, newest first.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn transactions(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Value>> {
    let transactions = WalletService::new(state.pool())
        .transactions(user.id)
        .await?;

    Ok(Json(json!({
        "success": true,
        "transactions": transactions,
    })))
}

/// Aggregate the ledger into totals.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn summary(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Value>> {
    let summary = WalletService::new(state.pool()).summary(user.id).await?;

    Ok(Json(json!({
        "success": true,
        "summary": summary,
    })))
}
