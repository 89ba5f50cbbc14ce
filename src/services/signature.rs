//! Razorpay checkout signature verification.
//!
//! The checkout widget hands back `razorpay_signature`, the hex HMAC-SHA256
//! of `order_id|payment_id` keyed with the account's key secret. Only the
//! provider and this server know the secret, so a matching digest proves the
//! payment went through the provider.

use hmac::{digest::InvalidLength, Hmac, Mac};
use sha2::Sha256;
use std::fmt;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

#[derive(Clone)]
pub struct SignatureVerifier {
    mac: HmacSha256,
}

impl SignatureVerifier {
    pub fn new(secret: &str) -> Result<Self, InvalidLength> {
        let mac = HmacSha256::new_from_slice(secret.as_bytes())?;
        Ok(Self { mac })
    }

    /// Lowercase hex HMAC-SHA256 of `message`.
    pub fn sign(&self, message: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(message.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    pub fn expected_signature(&self, order_id: &str, payment_id: &str) -> String {
        self.sign(&format!("{}|{}", order_id, payment_id))
    }

    /// Constant-time check of a caller-supplied signature.
    pub fn verify(&self, order_id: &str, payment_id: &str, signature: &str) -> bool {
        let expected = self.expected_signature(order_id, payment_id);
        expected.as_bytes().ct_eq(signature.as_bytes()).into()
    }
}

impl fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("secret", &"<redacted>")
            .finish()
    }
}
