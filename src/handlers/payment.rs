use crate::{
    app::AppState,
    error::ApiError,
    models::{VerificationRequest, VerificationSuccess},
};
use axum::{body::Bytes, extract::State, Json};

/// Verifies a checkout signature and, if it holds, credits the user.
///
/// Absent, `null` and empty fields all answer 400 "Missing required fields".
pub async fn verify_payment(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<VerificationSuccess>, ApiError> {
    let request: VerificationRequest =
        serde_json::from_slice(&body).map_err(ApiError::MalformedBody)?;
    let payment = request.into_confirmation().ok_or(ApiError::MissingFields)?;

    if !state
        .verifier
        .verify(&payment.order_id, &payment.payment_id, &payment.signature)
    {
        tracing::warn!(
            order_id = %payment.order_id,
            user_id = %payment.user_id,
            "Signature mismatch"
        );
        return Err(ApiError::InvalidSignature);
    }

    tracing::info!(
        payment_id = %payment.payment_id,
        "Payment signature verified successfully"
    );

    let new_credits = state
        .ledger
        .add_credits(&payment.user_id, state.credits_per_payment)
        .await?;

    tracing::info!(
        user_id = %payment.user_id,
        new_credits,
        "Credits updated for user {}. New total: {}",
        payment.user_id,
        new_credits
    );

    Ok(Json(VerificationSuccess {
        status: "success".to_string(),
        new_credits,
    }))
}
