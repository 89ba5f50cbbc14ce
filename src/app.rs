use crate::{
    config::Config,
    handlers::{health_check, use_credit, verify_payment},
    services::{CreditLedger, SignatureVerifier},
};
use anyhow::{anyhow, Result};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Instant;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

#[derive(Clone)]
pub struct AppState {
    pub verifier: Arc<SignatureVerifier>,
    pub ledger: Arc<dyn CreditLedger>,
    pub credits_per_payment: i64,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(
        verifier: SignatureVerifier,
        ledger: Arc<dyn CreditLedger>,
        credits_per_payment: i64,
    ) -> Self {
        Self {
            verifier: Arc::new(verifier),
            ledger,
            credits_per_payment,
            started_at: Instant::now(),
        }
    }

    pub fn from_config(config: &Config, ledger: Arc<dyn CreditLedger>) -> Result<Self> {
        let verifier = SignatureVerifier::new(&config.razorpay_key_secret)
            .map_err(|_| anyhow!("Invalid RAZORPAY_KEY_SECRET"))?;
        Ok(Self::new(verifier, ledger, config.credits_per_payment))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        // Payment confirmation from the checkout widget
        .route("/verify-payment-signature", post(verify_payment))
        .route("/verify-payment", post(verify_payment))
        .route("/api/use-credit", post(use_credit))
        .with_state(state)
        .layer(
            TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()),
        )
        .layer(CorsLayer::permissive())
}
