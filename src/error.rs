use crate::services::LedgerError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Missing required fields")]
    MissingFields,

    #[error("Invalid JSON body")]
    MalformedBody(#[source] serde_json::Error),

    #[error("Invalid payment signature")]
    InvalidSignature,

    #[error("User profile not found or error fetching: {0}")]
    ProfileNotFound(String),

    #[error("Failed to update credits in database: {0}")]
    CreditUpdate(String),

    #[error("An error occurred while processing credits.")]
    CreditUsage(#[source] LedgerError),
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::ProfileNotFound(_) | LedgerError::Read(_) => {
                ApiError::ProfileNotFound(err.to_string())
            }
            LedgerError::Write(_) | LedgerError::Conflict { .. } => {
                ApiError::CreditUpdate(err.to_string())
            }
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingFields | ApiError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            // Signature failures stay at 500: the checkout widget keys off it.
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::MissingFields => "MISSING_FIELDS",
            ApiError::MalformedBody(_) => "MALFORMED_BODY",
            ApiError::InvalidSignature => "INVALID_SIGNATURE",
            ApiError::ProfileNotFound(_) => "PROFILE_NOT_FOUND",
            ApiError::CreditUpdate(_) => "CREDIT_UPDATE_FAILED",
            ApiError::CreditUsage(_) => "CREDIT_USAGE_FAILED",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_code = self.error_code();

        if status.is_client_error() {
            tracing::warn!(error = %self, error_code, "Request rejected");
        } else {
            tracing::error!(error = ?self, error_code, "Request failed: {}", self);
        }

        let body = ErrorResponse {
            error: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
