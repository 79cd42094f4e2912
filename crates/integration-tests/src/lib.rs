//! Integration tests for Matchday.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database and run migrations
//! cargo run -p matchday-cli -- migrate
//! cargo run -p matchday-cli -- seed
//!
//! # Start the server
//! cargo run -p matchday-shop
//!
//! # Run integration tests
//! cargo test -p matchday-integration-tests -- --ignored
//! ```
//!
//! Tests talk to a running server over HTTP; each test registers its own
//! throwaway user so tests never share wallet or cart state.

use std::time::{SystemTime, UNIX_EPOCH};

use reqwest::Client;
use serde_json::{Value, json};

/// Base URL for the shop API (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("SHOP_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Create an HTTP client with a cookie store, so the session (and with it
/// the cart) persists across requests.
///
/// # Panics
///
/// Panics if the client cannot be built.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

/// Generate a unique email so parallel test runs never collide.
///
/// # Panics
///
/// Panics if the system clock is before the epoch.
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before epoch")
        .as_nanos();
    format!("{prefix}-{nanos}@test.example")
}

/// Register a fresh user and leave the client logged in.
///
/// # Panics
///
/// Panics if the registration request fails.
pub async fn register(client: &Client, email: &str) -> Value {
    let resp = client
        .post(format!("{}/auth/register", base_url()))
        .json(&json!({
            "email": email,
            "password": "test-password-123",
            "displayName": "Test User",
        }))
        .send()
        .await
        .expect("Failed to register");

    assert!(
        resp.status().is_success(),
        "registration failed: {}",
        resp.status()
    );
    resp.json().await.expect("Failed to parse registration body")
}

/// Top up the logged-in user's wallet. Amounts are decimal strings.
///
/// # Panics
///
/// Panics if the request fails.
pub async fn add_funds(client: &Client, amount: &str) -> Value {
    let resp = client
        .post(format!("{}/wallet/add", base_url()))
        .json(&json!({ "amount": amount }))
        .send()
        .await
        .expect("Failed to add funds");

    resp.json().await.expect("Failed to parse wallet body")
}

/// Fetch the first product from the catalog.
///
/// # Panics
///
/// Panics if the catalog is empty (run `matchday-cli seed` first).
pub async fn first_product(client: &Client) -> Value {
    let resp = client
        .get(format!("{}/shop/products", base_url()))
        .send()
        .await
        .expect("Failed to list products");

    let body: Value = resp.json().await.expect("Failed to parse products");
    body["products"]
        .as_array()
        .and_then(|products| products.first())
        .cloned()
        .expect("catalog is empty, seed it first")
}

/// Parse a JSON money value (serialized as a decimal string) to f64 for
/// assertions.
///
/// # Panics
///
/// Panics if the value is not a parseable decimal string.
#[must_use]
pub fn money(value: &Value) -> f64 {
    value
        .as_str()
        .expect("money value should be a string")
        .parse()
        .expect("money value should parse")
}

/// A complete shipping address for checkout bodies.
#[must_use]
pub fn shipping_address() -> Value {
    json!({
        "fullName": "Asha Rao",
        "line1": "14 Stadium Road",
        "city": "Pune",
        "state": "MH",
        "postalCode": "411001",
        "phone": "9876543210",
    })
}
