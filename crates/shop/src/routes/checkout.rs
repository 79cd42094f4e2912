//! Checkout route handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_sessions::Session;
use tracing::instrument;

use matchday_core::OrderId;

use crate::db::orders::OrderRepository;
use crate::error::{AppError, Result};
use crate::middleware::{self, RequireAuth};
use crate::models::ShippingAddress;
use crate::services::checkout::{CheckoutError, CheckoutService, PAYMENT_METHOD_WALLET};
use crate::state::AppState;

/// Checkout request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub shipping_address: ShippingAddress,
    /// Defaults to wallet, the only supported method.
    pub payment_method: Option<String>,
}

/// Run checkout for the session cart.
#[instrument(skip(state, session, user, body), fields(user_id = %user.id))]
pub async fn checkout(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Json(body): Json<CheckoutRequest>,
) -> Result<Json<Value>> {
    let cart_id = middleware::cart_id(&session)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .ok_or(AppError::Checkout(CheckoutError::EmptyCart))?;

    let cart = crate::services::cart::CartService::new(state.pool())
        .get(cart_id)
        .await
        .map_err(AppError::Cart)?
        .ok_or(AppError::Checkout(CheckoutError::EmptyCart))?;

    let payment_method = body
        .payment_method
        .as_deref()
        .unwrap_or(PAYMENT_METHOD_WALLET);

    let receipt = CheckoutService::new(state.pool())
        .checkout(user.id, &cart, &body.shipping_address, payment_method)
        .await?;

    Ok(Json(json!({
        "success": true,
        "orderId": receipt.order_id,
        "total": receipt.total,
        "formattedTotal": receipt.total.formatted(),
        "transaction": receipt.transaction,
    })))
}

/// Show a confirmed order after checkout.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn success(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(order_id): Path<OrderId>,
) -> Result<Json<Value>> {
    let order = OrderRepository::new(state.pool())
        .get(order_id)
        .await?
        .filter(|order| order.user_id == user.id)
        .ok_or_else(|| AppError::NotFound(format!("order {order_id}")))?;

    Ok(Json(json!({
        "success": true,
        "order": order,
    })))
}
