use serde::{Deserialize, Serialize};

/// Payload posted by the checkout widget after a successful payment.
/// Every field is optional here so that absent and empty values can be
/// rejected with the same message.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VerificationRequest {
    #[serde(default, alias = "razorpay_order_id")]
    pub order_id: Option<String>,
    #[serde(default, alias = "razorpay_payment_id")]
    pub payment_id: Option<String>,
    #[serde(default, alias = "razorpay_signature")]
    pub signature: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// A verification request with all four fields present and non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentConfirmation {
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
    pub user_id: String,
}

impl VerificationRequest {
    pub fn into_confirmation(self) -> Option<PaymentConfirmation> {
        Some(PaymentConfirmation {
            order_id: non_empty(self.order_id)?,
            payment_id: non_empty(self.payment_id)?,
            signature: non_empty(self.signature)?,
            user_id: non_empty(self.user_id)?,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VerificationSuccess {
    pub status: String,
    pub new_credits: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UseCreditRequest {
    #[serde(default)]
    pub user_id: Option<String>,
}

impl UseCreditRequest {
    pub fn user_id(self) -> Option<String> {
        non_empty(self.user_id)
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UseCreditResponse {
    pub status: String,
    pub credits_remaining: i64,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
