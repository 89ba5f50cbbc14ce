use crate::{
    app::AppState,
    error::ApiError,
    models::{UseCreditRequest, UseCreditResponse},
    services::SpendOutcome,
};
use axum::{body::Bytes, extract::State, Json};

const CREDITS_PER_USE: i64 = 1;

/// Spends one credit for the user, or reports that none are left.
pub async fn use_credit(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<UseCreditResponse>, ApiError> {
    let request: UseCreditRequest =
        serde_json::from_slice(&body).map_err(ApiError::MalformedBody)?;
    let user_id = request.user_id().ok_or(ApiError::MissingFields)?;

    let outcome = state
        .ledger
        .spend_credits(&user_id, CREDITS_PER_USE)
        .await
        .map_err(ApiError::CreditUsage)?;

    let response = match outcome {
        SpendOutcome::Spent { remaining } => {
            tracing::info!(user_id = %user_id, remaining, "Credit used");
            UseCreditResponse {
                status: "success".to_string(),
                credits_remaining: remaining,
            }
        }
        SpendOutcome::Insufficient { current } => {
            tracing::info!(user_id = %user_id, current, "Insufficient credits");
            UseCreditResponse {
                status: "insufficient_credits".to_string(),
                credits_remaining: 0,
            }
        }
    };

    Ok(Json(response))
}
