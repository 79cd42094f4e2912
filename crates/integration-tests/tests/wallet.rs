//! Integration tests for the wallet ledger.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The shop server running (cargo run -p matchday-shop)
//!
//! Run with: cargo test -p matchday-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::Value;

use matchday_integration_tests::{add_funds, base_url, client, money, register, unique_email};

#[tokio::test]
#[ignore = "Requires running shop server"]
async fn test_balance_starts_at_zero_and_figures_agree() {
    let client = client();
    register(&client, &unique_email("wallet-zero")).await;

    let resp = client
        .get(format!("{}/wallet/balance", base_url()))
        .send()
        .await
        .expect("Failed to get balance");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Failed to parse balance");
    assert_eq!(body["success"], true);
    assert!((money(&body["balance"]) - 0.0).abs() < f64::EPSILON);
    assert!((money(&body["calculatedBalance"]) - 0.0).abs() < f64::EPSILON);
}

#[tokio::test]
#[ignore = "Requires running shop server"]
async fn test_credits_chain_balance_after() {
    let client = client();
    register(&client, &unique_email("wallet-chain")).await;

    let credited = add_funds(&client, "100").await;
    assert_eq!(credited["success"], true);
    assert!((money(&credited["newBalance"]) - 100.0).abs() < 0.001);
    assert_eq!(credited["transaction"]["transactionType"], "credit");
    assert!((money(&credited["transaction"]["balanceAfter"]) - 100.0).abs() < 0.001);

    let reference = credited["transaction"]["referenceId"]
        .as_str()
        .expect("reference id present");
    assert!(reference.starts_with("TXN-"));
    assert_eq!(reference.len(), "TXN-".len() + 12);

    // Second credit chains on top of the first.
    let again = add_funds(&client, "40").await;
    assert!((money(&again["newBalance"]) - 140.0).abs() < 0.001);

    // Ledger lists both entries, newest first.
    let resp = client
        .get(format!("{}/wallet/transactions", base_url()))
        .send()
        .await
        .expect("Failed to list transactions");
    let body: Value = resp.json().await.expect("Failed to parse transactions");
    let transactions = body["transactions"].as_array().expect("array");
    assert_eq!(transactions.len(), 2);
    assert!((money(&transactions[0]["balanceAfter"]) - 140.0).abs() < 0.001);
    assert!((money(&transactions[1]["balanceAfter"]) - 100.0).abs() < 0.001);

    // Cached and derived balances agree after the writes.
    let resp = client
        .get(format!("{}/wallet/balance", base_url()))
        .send()
        .await
        .expect("Failed to get balance");
    let body: Value = resp.json().await.expect("Failed to parse balance");
    assert!((money(&body["balance"]) - money(&body["calculatedBalance"])).abs() < f64::EPSILON);
}

#[tokio::test]
#[ignore = "Requires running shop server"]
async fn test_amount_validation_leaves_no_ledger_row() {
    let client = client();
    register(&client, &unique_email("wallet-validation")).await;

    for bad_amount in ["0", "-5", "0.50", "50001"] {
        let resp = client
            .post(format!("{}/wallet/add", base_url()))
            .json(&serde_json::json!({ "amount": bad_amount }))
            .send()
            .await
            .expect("Failed to post top-up");
        assert_eq!(
            resp.status(),
            StatusCode::BAD_REQUEST,
            "amount {bad_amount} should be rejected"
        );

        let body: Value = resp.json().await.expect("Failed to parse error");
        assert_eq!(body["success"], false);
        assert!(body["error"].is_string());
    }

    let resp = client
        .get(format!("{}/wallet/summary", base_url()))
        .send()
        .await
        .expect("Failed to get summary");
    let body: Value = resp.json().await.expect("Failed to parse summary");
    assert_eq!(body["summary"]["transactionCount"], 0);
}

#[tokio::test]
#[ignore = "Requires running shop server"]
async fn test_summary_totals() {
    let client = client();
    register(&client, &unique_email("wallet-summary")).await;

    add_funds(&client, "250").await;
    add_funds(&client, "750").await;

    let resp = client
        .get(format!("{}/wallet/summary", base_url()))
        .send()
        .await
        .expect("Failed to get summary");
    let body: Value = resp.json().await.expect("Failed to parse summary");

    assert_eq!(body["success"], true);
    assert!((money(&body["summary"]["totalCredits"]) - 1000.0).abs() < 0.001);
    assert!((money(&body["summary"]["totalDebits"]) - 0.0).abs() < f64::EPSILON);
    assert_eq!(body["summary"]["transactionCount"], 2);
}

#[tokio::test]
#[ignore = "Requires running shop server"]
async fn test_wallet_requires_login() {
    // No registration; bare client with no session.
    let client = client();

    let resp = client
        .get(format!("{}/wallet/balance", base_url()))
        .send()
        .await
        .expect("Failed to get balance");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body: Value = resp.json().await.expect("Failed to parse error");
    assert_eq!(body["success"], false);
}
