#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use hmac::{Hmac, Mac};
use payment_credits::{
    app::{router, AppState},
    services::{CreditLedger, InMemoryLedger, LedgerError, SignatureVerifier, SpendOutcome},
};
use serde_json::Value;
use sha2::Sha256;
use std::sync::Arc;
use tower::ServiceExt;

pub const SECRET: &str = "rzp_test_key_secret";
pub const CREDITS_PER_PAYMENT: i64 = 50;

/// Hex HMAC-SHA256 of `order_id|payment_id`, computed the way the provider does.
pub fn provider_signature(order_id: &str, payment_id: &str) -> String {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(SECRET.as_bytes()).expect("HMAC can take key of any size");
    mac.update(format!("{}|{}", order_id, payment_id).as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

pub fn test_app(ledger: Arc<dyn CreditLedger>) -> Router {
    let verifier = SignatureVerifier::new(SECRET).unwrap();
    router(AppState::new(verifier, ledger, CREDITS_PER_PAYMENT))
}

pub fn memory_app(ledger: &Arc<InMemoryLedger>) -> Router {
    test_app(ledger.clone())
}

pub async fn post_raw(app: Router, uri: &str, body: impl Into<Body>) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(body.into())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap();
    (status, body)
}

pub async fn post_json(app: Router, uri: &str, body: &Value) -> (StatusCode, Value) {
    post_raw(app, uri, serde_json::to_vec(body).unwrap()).await
}

/// Ledger whose every call fails with the configured error.
pub struct FailingLedger {
    pub error: LedgerError,
}

#[async_trait]
impl CreditLedger for FailingLedger {
    async fn add_credits(&self, _user_id: &str, _amount: i64) -> Result<i64, LedgerError> {
        Err(self.error.clone())
    }

    async fn spend_credits(
        &self,
        _user_id: &str,
        _amount: i64,
    ) -> Result<SpendOutcome, LedgerError> {
        Err(self.error.clone())
    }

    async fn ping(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}
