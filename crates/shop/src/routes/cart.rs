//! Cart route handlers.
//!
//! The session holds only the durable cart's ID; every handler loads the cart
//! fresh and the response carries derived totals computed from the lines.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tower_sessions::Session;
use tracing::instrument;

use matchday_core::{CartId, CartItemId, Money, ProductId};

use crate::error::{AppError, Result};
use crate::middleware::{self, OptionalAuth, set_cart_id};
use crate::models::{Cart, CartItem};
use crate::services::cart::{CartError, CartService};
use crate::state::AppState;

/// Cart data sent to the client, with derived totals.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub id: CartId,
    pub items: Vec<CartItem>,
    pub item_count: u32,
    pub total_amount: Money,
    pub formatted_total: String,
    /// Concurrency token; echo unchanged carts back to detect lost updates.
    pub revision: i32,
}

impl TryFrom<Cart> for CartView {
    type Error = CartError;

    fn try_from(cart: Cart) -> std::result::Result<Self, Self::Error> {
        let total_amount = cart.total_amount()?;
        Ok(Self {
            id: cart.id,
            item_count: cart.item_count(),
            total_amount,
            formatted_total: total_amount.formatted(),
            revision: cart.revision,
            items: cart.items,
        })
    }
}

/// Update cart request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartRequest {
    pub item_id: CartItemId,
    pub quantity: u32,
}

/// Remove from cart request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveFromCartRequest {
    pub item_id: CartItemId,
}

/// Add to cart request body.
#[derive(Debug, Default, Deserialize)]
pub struct AddToCartRequest {
    pub quantity: Option<u32>,
}

/// Load the session's cart, creating and remembering one if needed.
async fn session_cart(
    state: &AppState,
    session: &Session,
    user: Option<&crate::models::CurrentUser>,
) -> Result<Cart> {
    let stored = middleware::cart_id(session)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let service = CartService::new(state.pool());
    let cart = service
        .get_or_create(stored, user.map(|u| u.id))
        .await
        .map_err(AppError::Cart)?;

    if stored != Some(cart.id) {
        set_cart_id(session, cart.id)
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;
    }

    Ok(cart)
}

/// Display the cart snapshot.
#[instrument(skip(state, session, user))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Result<Json<Value>> {
    let cart = session_cart(&state, &session, user.as_ref()).await?;
    let view = CartView::try_from(cart).map_err(AppError::Cart)?;

    Ok(Json(json!({
        "success": true,
        "cart": view,
    })))
}

/// Add a product to the cart.
#[instrument(skip(state, session, user, body))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Path(product_id): Path<ProductId>,
    Json(body): Json<AddToCartRequest>,
) -> Result<Json<Value>> {
    let quantity = body.quantity.unwrap_or(1);

    let cart = session_cart(&state, &session, user.as_ref()).await?;

    let updated = CartService::new(state.pool())
        .add_item(&cart, product_id, quantity)
        .await?;

    let view = CartView::try_from(updated).map_err(AppError::Cart)?;

    Ok(Json(json!({
        "success": true,
        "count": view.item_count,
        "cart": view,
    })))
}

/// Set a line's quantity. Zero removes the line.
#[instrument(skip(state, session, user, body))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Json(body): Json<UpdateCartRequest>,
) -> Result<Json<Value>> {
    let cart = session_cart(&state, &session, user.as_ref()).await?;

    let updated = CartService::new(state.pool())
        .set_quantity(&cart, body.item_id, body.quantity)
        .await?;

    let view = CartView::try_from(updated).map_err(AppError::Cart)?;

    Ok(Json(json!({
        "success": true,
        "count": view.item_count,
        "cart": view,
    })))
}

/// Remove a line from the cart.
#[instrument(skip(state, session, user, body))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Json(body): Json<RemoveFromCartRequest>,
) -> Result<Json<Value>> {
    let cart = session_cart(&state, &session, user.as_ref()).await?;

    let updated = CartService::new(state.pool())
        .remove_item(&cart, body.item_id)
        .await?;

    let view = CartView::try_from(updated).map_err(AppError::Cart)?;

    Ok(Json(json!({
        "success": true,
        "count": view.item_count,
        "cart": view,
    })))
}

/// Get the cart item count.
#[instrument(skip(state, session, user))]
pub async fn count(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Result<Json<Value>> {
    let cart = session_cart(&state, &session, user.as_ref()).await?;

    Ok(Json(json!({
        "success": true,
        "count": cart.item_count(),
    })))
}
