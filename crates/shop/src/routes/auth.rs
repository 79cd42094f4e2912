//! Authentication route handlers.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tower_sessions::Session;
use tracing::instrument;

use matchday_core::{Money, Role, WalletStatus};

use crate::error::{AppError, Result};
use crate::middleware::{self, clear_current_user, set_current_user};
use crate::models::{CurrentUser, User};
use crate::services::auth::AuthService;
use crate::services::cart::CartService;
use crate::state::AppState;

/// Registration request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub display_name: String,
    /// Defaults to player.
    pub role: Option<Role>,
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// User data sent to the client. Never includes the password hash.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: matchday_core::UserId,
    pub email: String,
    pub display_name: String,
    pub role: Role,
    pub wallet_balance: Money,
    pub wallet_status: WalletStatus,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.as_str().to_owned(),
            display_name: user.display_name.clone(),
            role: user.role,
            wallet_balance: user.wallet_balance,
            wallet_status: user.wallet_status,
        }
    }
}

/// Create an account and log the new user in.
#[instrument(skip(state, session, body), fields(email = %body.email))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<RegisterRequest>,
) -> Result<Json<Value>> {
    let auth = AuthService::new(state.pool());
    let user = auth
        .register(
            &body.email,
            &body.password,
            &body.display_name,
            body.role.unwrap_or_default(),
        )
        .await?;

    start_session(&session, &state, &user).await?;

    tracing::info!(user_id = %user.id, "User registered");

    Ok(Json(json!({
        "success": true,
        "user": UserView::from(&user),
    })))
}

/// Log in with email and password.
#[instrument(skip(state, session, body), fields(email = %body.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<LoginRequest>,
) -> Result<Json<Value>> {
    let auth = AuthService::new(state.pool());
    let user = auth.login(&body.email, &body.password).await?;

    start_session(&session, &state, &user).await?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(json!({
        "success": true,
        "user": UserView::from(&user),
    })))
}

/// Log out. The durable cart stays attached to the session.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Json<Value>> {
    clear_current_user(&session)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!({ "success": true })))
}

/// Store the user in the session and stamp them onto the session cart.
async fn start_session(session: &Session, state: &AppState, user: &User) -> Result<()> {
    let current = CurrentUser {
        id: user.id,
        email: user.email.clone(),
        role: user.role,
    };
    set_current_user(session, &current)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    // A cart built while browsing as a guest becomes the user's cart.
    if let Some(cart_id) = middleware::cart_id(session)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    {
        CartService::new(state.pool())
            .claim_for_user(cart_id, user.id)
            .await?;
    }

    Ok(())
}
