//! HTTP route handlers for the shop.
//!
//! Every handler speaks JSON; successes carry `"success": true` and failures
//! the `{success:false, error}` envelope from [`crate::error::AppError`].
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                      - Liveness check
//! GET  /health/ready                - Readiness check (DB ping)
//!
//! # Auth
//! POST /auth/register               - Create an account and log in
//! POST /auth/login                  - Login
//! POST /auth/logout                 - Logout (cart survives)
//!
//! # Catalog
//! GET  /shop/products               - Product listing (?q=&category=)
//! GET  /shop/products/{id}          - Product detail
//!
//! # Cart
//! POST /shop/add-to-cart/{id}       - Add product, returns {success,count,cart}
//! GET  /cart                        - Cart snapshot with derived totals
//! POST /cart/update                 - Set line quantity (0 removes)
//! POST /cart/remove                 - Remove a line
//! GET  /cart/count                  - Item count badge
//!
//! # Checkout (requires auth)
//! POST /shop/checkout               - Atomic checkout, returns {success,orderId}
//! GET  /shop/checkout-success/{id}  - Confirmed order
//!
//! # Account (requires auth)
//! GET  /account/orders              - Order history
//!
//! # Wallet (requires auth)
//! GET  /wallet/balance              - Cached + ledger-derived balance
//! POST /wallet/add                  - Top-up
//! GET  /wallet/transactions         - Ledger, newest first
//! GET  /wallet/summary              - Credit/debit totals
//! ```

pub mod account;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod health;
pub mod products;
pub mod wallet;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
}

/// Create the shop routes router (catalog + checkout).
pub fn shop_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::index))
        .route("/products/{id}", get(products::show))
        .route("/add-to-cart/{id}", post(cart::add))
        .route("/checkout", post(checkout::checkout))
        .route("/checkout-success/{id}", get(checkout::success))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new().route("/orders", get(account::orders))
}

/// Create the wallet routes router.
pub fn wallet_routes() -> Router<AppState> {
    Router::new()
        .route("/balance", get(wallet::balance))
        .route("/add", post(wallet::add))
        .route("/transactions", get(wallet::transactions))
        .route("/summary", get(wallet::summary))
}

/// Create all routes for the shop.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::ready))
        .nest("/auth", auth_routes())
        .nest("/shop", shop_routes())
        .nest("/cart", cart_routes())
        .nest("/account", account_routes())
        .nest("/wallet", wallet_routes())
}
