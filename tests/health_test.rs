mod common;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use common::*;
use payment_credits::services::{InMemoryLedger, LedgerError};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

async fn get_health(app: Router) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn healthy_when_store_answers() {
    let ledger = Arc::new(InMemoryLedger::new());

    let (status, body) = get_health(memory_app(&ledger)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["store"], "memory");
    assert_eq!(body["store_ok"], true);
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn degraded_when_store_is_down() {
    let ledger = Arc::new(FailingLedger {
        error: LedgerError::Read("down".to_string()),
    });

    let (status, body) = get_health(test_app(ledger)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["store_ok"], false);
}

#[tokio::test]
async fn verification_routes_reject_get() {
    let ledger = Arc::new(InMemoryLedger::new());

    let response = memory_app(&ledger)
        .oneshot(
            Request::builder()
                .uri("/verify-payment-signature")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
