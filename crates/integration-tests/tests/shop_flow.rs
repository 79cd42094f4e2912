//! Integration tests for the cart and checkout flow.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied and the
//!   catalog seeded (cargo run -p matchday-cli -- migrate / seed)
//! - The shop server running (cargo run -p matchday-shop)
//!
//! Run with: cargo test -p matchday-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::{Value, json};

use matchday_integration_tests::{
    add_funds, base_url, client, first_product, money, register, shipping_address, unique_email,
};

/// Add a product to the session cart and return the response body.
async fn add_to_cart(client: &reqwest::Client, product_id: i64, quantity: u32) -> Value {
    let resp = client
        .post(format!("{}/shop/add-to-cart/{product_id}", base_url()))
        .json(&json!({ "quantity": quantity }))
        .send()
        .await
        .expect("Failed to add to cart");

    resp.json().await.expect("Failed to parse cart body")
}

#[tokio::test]
#[ignore = "Requires running shop server with seeded catalog"]
async fn test_cart_totals_derive_from_lines() {
    let client = client();
    let product = first_product(&client).await;
    let product_id = product["id"].as_i64().expect("product id");
    let price = money(&product["price"]);

    let body = add_to_cart(&client, product_id, 2).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 2);
    assert!((money(&body["cart"]["totalAmount"]) - price * 2.0).abs() < 0.001);

    // Adding the same product again bumps the line, not a new line.
    let body = add_to_cart(&client, product_id, 1).await;
    assert_eq!(body["count"], 3);
    assert_eq!(body["cart"]["items"].as_array().expect("items").len(), 1);
    assert!((money(&body["cart"]["totalAmount"]) - price * 3.0).abs() < 0.001);
}

#[tokio::test]
#[ignore = "Requires running shop server with seeded catalog"]
async fn test_update_and_remove_recompute_totals() {
    let client = client();
    let product = first_product(&client).await;
    let product_id = product["id"].as_i64().expect("product id");
    let price = money(&product["price"]);

    let body = add_to_cart(&client, product_id, 2).await;
    let item_id = body["cart"]["items"][0]["id"].as_i64().expect("item id");

    // Shrink the line to one unit.
    let resp = client
        .post(format!("{}/cart/update", base_url()))
        .json(&json!({ "itemId": item_id, "quantity": 1 }))
        .send()
        .await
        .expect("Failed to update cart");
    let body: Value = resp.json().await.expect("Failed to parse update body");
    assert_eq!(body["count"], 1);
    assert!((money(&body["cart"]["totalAmount"]) - price).abs() < 0.001);

    // Remove the line entirely.
    let resp = client
        .post(format!("{}/cart/remove", base_url()))
        .json(&json!({ "itemId": item_id }))
        .send()
        .await
        .expect("Failed to remove from cart");
    let body: Value = resp.json().await.expect("Failed to parse remove body");
    assert_eq!(body["count"], 0);
    assert!((money(&body["cart"]["totalAmount"]) - 0.0).abs() < f64::EPSILON);
}

#[tokio::test]
#[ignore = "Requires running shop server with seeded catalog"]
async fn test_add_nonexistent_product_is_404() {
    let client = client();

    let resp = client
        .post(format!("{}/shop/add-to-cart/999999", base_url()))
        .json(&json!({ "quantity": 1 }))
        .send()
        .await
        .expect("Failed to post add-to-cart");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: Value = resp.json().await.expect("Failed to parse error");
    assert_eq!(body["success"], false);
}

#[tokio::test]
#[ignore = "Requires running shop server"]
async fn test_empty_cart_checkout_fails() {
    let client = client();
    register(&client, &unique_email("checkout-empty")).await;

    let resp = client
        .post(format!("{}/shop/checkout", base_url()))
        .json(&json!({ "shippingAddress": shipping_address() }))
        .send()
        .await
        .expect("Failed to post checkout");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = resp.json().await.expect("Failed to parse error");
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "cart is empty");
}

#[tokio::test]
#[ignore = "Requires running shop server with seeded catalog"]
async fn test_incomplete_shipping_fails_by_field_name() {
    let client = client();
    register(&client, &unique_email("checkout-shipping")).await;
    add_funds(&client, "5000").await;

    let product = first_product(&client).await;
    add_to_cart(&client, product["id"].as_i64().expect("id"), 1).await;

    let mut address = shipping_address();
    address["postalCode"] = json!("");

    let resp = client
        .post(format!("{}/shop/checkout", base_url()))
        .json(&json!({ "shippingAddress": address }))
        .send()
        .await
        .expect("Failed to post checkout");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = resp.json().await.expect("Failed to parse error");
    assert_eq!(body["error"], "missing shipping field: postalCode");
}

#[tokio::test]
#[ignore = "Requires running shop server with seeded catalog"]
async fn test_insufficient_balance_leaves_everything_untouched() {
    let client = client();
    register(&client, &unique_email("checkout-poor")).await;

    let product = first_product(&client).await;
    add_to_cart(&client, product["id"].as_i64().expect("id"), 1).await;

    // No top-up; balance is zero.
    let resp = client
        .post(format!("{}/shop/checkout", base_url()))
        .json(&json!({ "shippingAddress": shipping_address() }))
        .send()
        .await
        .expect("Failed to post checkout");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = resp.json().await.expect("Failed to parse error");
    assert_eq!(body["error"], "insufficient wallet balance");

    // The cart is still intact and no order was created.
    let resp = client
        .get(format!("{}/cart/count", base_url()))
        .send()
        .await
        .expect("Failed to get cart count");
    let count: Value = resp.json().await.expect("Failed to parse count");
    assert_eq!(count["count"], 1);

    let resp = client
        .get(format!("{}/account/orders", base_url()))
        .send()
        .await
        .expect("Failed to list orders");
    let orders: Value = resp.json().await.expect("Failed to parse orders");
    assert_eq!(orders["orders"].as_array().expect("orders").len(), 0);
}

#[tokio::test]
#[ignore = "Requires running shop server with seeded catalog"]
async fn test_checkout_above_wallet_cap_fails() {
    let client = client();
    register(&client, &unique_email("checkout-cap")).await;

    // Fill the cart past the per-transaction wallet limit.
    let resp = client
        .get(format!("{}/shop/products", base_url()))
        .send()
        .await
        .expect("Failed to list products");
    let body: Value = resp.json().await.expect("Failed to parse products");

    let mut total = 0.0;
    for product in body["products"].as_array().expect("products") {
        if total > 50_000.0 {
            break;
        }
        let quantity = product["stock"].as_u64().expect("stock").min(99);
        if quantity == 0 {
            continue;
        }
        add_to_cart(
            &client,
            product["id"].as_i64().expect("id"),
            u32::try_from(quantity).expect("quantity fits"),
        )
        .await;
        total += money(&product["price"]) * quantity as f64;
    }
    assert!(total > 50_000.0, "seeded catalog cannot exceed the cap");

    let resp = client
        .post(format!("{}/shop/checkout", base_url()))
        .json(&json!({ "shippingAddress": shipping_address() }))
        .send()
        .await
        .expect("Failed to post checkout");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = resp.json().await.expect("Failed to parse error");
    assert_eq!(body["error"], "maximum amount is ₹50000 per transaction");

    // Nothing was ordered or debited.
    let resp = client
        .get(format!("{}/account/orders", base_url()))
        .send()
        .await
        .expect("Failed to list orders");
    let orders: Value = resp.json().await.expect("Failed to parse orders");
    assert_eq!(orders["orders"].as_array().expect("orders").len(), 0);
}

#[tokio::test]
#[ignore = "Requires running shop server with seeded catalog"]
async fn test_full_checkout_flow() {
    let client = client();
    register(&client, &unique_email("checkout-full")).await;
    add_funds(&client, "10000").await;

    let product = first_product(&client).await;
    let price = money(&product["price"]);
    add_to_cart(&client, product["id"].as_i64().expect("id"), 2).await;

    let resp = client
        .post(format!("{}/shop/checkout", base_url()))
        .json(&json!({ "shippingAddress": shipping_address() }))
        .send()
        .await
        .expect("Failed to post checkout");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Failed to parse checkout body");
    assert_eq!(body["success"], true);
    let order_id = body["orderId"].as_i64().expect("order id");
    assert!((money(&body["total"]) - price * 2.0).abs() < 0.001);
    assert_eq!(body["transaction"]["transactionType"], "debit");
    assert_eq!(body["transaction"]["orderId"], order_id);

    // The cart was emptied inside the same transaction.
    let resp = client
        .get(format!("{}/cart/count", base_url()))
        .send()
        .await
        .expect("Failed to get cart count");
    let count: Value = resp.json().await.expect("Failed to parse count");
    assert_eq!(count["count"], 0);

    // The order is confirmed and readable.
    let resp = client
        .get(format!("{}/shop/checkout-success/{order_id}", base_url()))
        .send()
        .await
        .expect("Failed to get order");
    let body: Value = resp.json().await.expect("Failed to parse order");
    assert_eq!(body["order"]["status"], "confirmed");
    assert_eq!(body["order"]["items"].as_array().expect("items").len(), 1);

    // The wallet balance dropped by the total and the figures agree.
    let resp = client
        .get(format!("{}/wallet/balance", base_url()))
        .send()
        .await
        .expect("Failed to get balance");
    let balance: Value = resp.json().await.expect("Failed to parse balance");
    assert!((money(&balance["balance"]) - (10000.0 - price * 2.0)).abs() < 0.001);
    assert!(
        (money(&balance["balance"]) - money(&balance["calculatedBalance"])).abs() < f64::EPSILON
    );
}

#[tokio::test]
#[ignore = "Requires running shop server with seeded catalog"]
async fn test_concurrent_checkouts_cannot_both_debit() {
    let email = unique_email("checkout-race");

    // Two sessions for the same user, each with its own cart.
    let first = client();
    register(&first, &email).await;

    let second = client();
    let resp = second
        .post(format!("{}/auth/login", base_url()))
        .json(&json!({ "email": email, "password": "test-password-123" }))
        .send()
        .await
        .expect("Failed to login second session");
    assert!(resp.status().is_success());

    let product = first_product(&first).await;
    let product_id = product["id"].as_i64().expect("id");
    let price = money(&product["price"]);

    // Fund enough for one checkout but not two.
    add_funds(&first, &format!("{}", price + 1.0)).await;

    add_to_cart(&first, product_id, 1).await;
    add_to_cart(&second, product_id, 1).await;

    let checkout = |c: reqwest::Client| async move {
        c.post(format!("{}/shop/checkout", base_url()))
            .json(&json!({ "shippingAddress": shipping_address() }))
            .send()
            .await
            .expect("Failed to post checkout")
            .status()
    };

    let (a, b) = tokio::join!(checkout(first.clone()), checkout(second.clone()));
    let successes = [a, b].iter().filter(|s| s.is_success()).count();
    assert_eq!(successes, 1, "exactly one checkout may debit the wallet");
}

#[tokio::test]
#[ignore = "Requires running shop server with seeded catalog"]
async fn test_cart_survives_logout() {
    let client = client();
    let email = unique_email("cart-logout");
    register(&client, &email).await;

    let product = first_product(&client).await;
    add_to_cart(&client, product["id"].as_i64().expect("id"), 1).await;

    let resp = client
        .post(format!("{}/auth/logout", base_url()))
        .send()
        .await
        .expect("Failed to logout");
    assert!(resp.status().is_success());

    // Same session cookie, logged out: the cart is still there.
    let resp = client
        .get(format!("{}/cart/count", base_url()))
        .send()
        .await
        .expect("Failed to get cart count");
    let count: Value = resp.json().await.expect("Failed to parse count");
    assert_eq!(count["count"], 1);
}
