//! Account route handlers.

use axum::{Json, extract::State};
use serde_json::{Value, json};
use tracing::instrument;

use crate::db::orders::OrderRepository;
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// Order history for the logged-in user, newest first.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn orders(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Value>> {
    let orders = OrderRepository::new(state.pool()).list_for_user(user.id).await?;

    Ok(Json(json!({
        "success": true,
        "orders": orders,
    })))
}
