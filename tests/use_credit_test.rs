mod common;

use axum::http::StatusCode;
use common::*;
use payment_credits::services::{InMemoryLedger, LedgerError};
use serde_json::json;
use std::sync::Arc;

const URI: &str = "/api/use-credit";

#[tokio::test]
async fn deducts_one_credit() {
    let ledger = Arc::new(InMemoryLedger::new().with_profile("user-1", Some(3)));

    let (status, body) = post_json(memory_app(&ledger), URI, &json!({ "user_id": "user-1" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "success", "credits_remaining": 2 }));
    assert_eq!(ledger.credits("user-1"), Some(Some(2)));
}

#[tokio::test]
async fn empty_balance_reports_insufficient_credits() {
    let ledger = Arc::new(InMemoryLedger::new().with_profile("user-1", None));

    let (status, body) = post_json(memory_app(&ledger), URI, &json!({ "user_id": "user-1" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "status": "insufficient_credits", "credits_remaining": 0 })
    );
    assert_eq!(ledger.writes(), 0);
}

#[tokio::test]
async fn missing_user_id_is_a_bad_request() {
    let ledger = Arc::new(InMemoryLedger::new());

    let (status, body) = post_json(memory_app(&ledger), URI, &json!({ "user_id": "" })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Missing required fields" }));
    assert_eq!(ledger.reads(), 0);
}

#[tokio::test]
async fn unknown_user_is_a_generic_server_error() {
    let ledger = Arc::new(InMemoryLedger::new());

    let (status, body) = post_json(memory_app(&ledger), URI, &json!({ "user_id": "ghost" })).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({ "error": "An error occurred while processing credits." })
    );
}

#[tokio::test]
async fn store_failure_hides_the_cause() {
    let ledger = Arc::new(FailingLedger {
        error: LedgerError::Read("connection refused".to_string()),
    });

    let (status, body) = post_json(test_app(ledger), URI, &json!({ "user_id": "user-1" })).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body["error"],
        "An error occurred while processing credits."
    );
}

#[tokio::test]
async fn payment_then_usage_round_trip() {
    let ledger = Arc::new(InMemoryLedger::new().with_profile("user-1", Some(0)));

    let payment = json!({
        "order_id": "order_1",
        "payment_id": "pay_1",
        "signature": provider_signature("order_1", "pay_1"),
        "user_id": "user-1",
    });
    let (status, _) = post_json(memory_app(&ledger), "/verify-payment-signature", &payment).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = post_json(memory_app(&ledger), URI, &json!({ "user_id": "user-1" })).await;
    assert_eq!(body["credits_remaining"], 49);
}
