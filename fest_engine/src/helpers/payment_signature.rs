//! # Payment signature format
//!
//! After the registrant completes a charge, the checkout widget hands the client three values: the order id we
//! created, the payment id the gateway assigned, and a signature. The client forwards all three with the registration
//! form. Anyone could fill in plausible-looking ids, so the signature is what proves the payment really happened.
//!
//! The gateway computes the signature with the merchant's API key secret, which never leaves the server:
//!
//! ```text
//!    hex( HMAC-SHA256( key_secret, "{order_id}|{payment_id}" ) )
//! ```
//!
//! The hex digest is lower-case, so a valid signature is always exactly 64 characters of `[0-9a-f]`.
//!
//! Verification recomputes the MAC and compares it against the decoded claim in constant time.

use fest_common::Secret;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

const SIGNATURE_HEX_LEN: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("Payment verification failed: Missing payment details. Registration requires completed payment.")]
    MissingFields,
    #[error(
        "Payment verification failed: Invalid payment signature. Registration cannot proceed without valid payment."
    )]
    InvalidSignature,
    #[error("Payment configuration error. Please contact support.")]
    ConfigurationError,
}

/// The (order id, payment id, signature) triple returned by the gateway after a successful charge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentProof {
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
}

impl PaymentProof {
    pub fn new<S: Into<String>>(order_id: S, payment_id: S, signature: S) -> Self {
        Self { order_id: order_id.into(), payment_id: payment_id.into(), signature: signature.into() }
    }

    pub fn is_complete(&self) -> bool {
        !self.order_id.trim().is_empty() && !self.payment_id.trim().is_empty() && !self.signature.trim().is_empty()
    }

    pub fn message(&self) -> String {
        signature_message(&self.order_id, &self.payment_id)
    }

    pub fn verify(&self, secret: &Secret<String>) -> Result<(), SignatureError> {
        verify_payment_signature(&self.order_id, &self.payment_id, &self.signature, secret)
    }
}

pub fn signature_message(order_id: &str, payment_id: &str) -> String {
    format!("{order_id}|{payment_id}")
}

fn new_mac(secret: &Secret<String>) -> Result<HmacSha256, SignatureError> {
    if secret.is_blank() {
        return Err(SignatureError::ConfigurationError);
    }
    HmacSha256::new_from_slice(secret.reveal().as_bytes()).map_err(|_| SignatureError::ConfigurationError)
}

/// Produces the signature the gateway would issue for this order and payment.
pub fn sign_payment(order_id: &str, payment_id: &str, secret: &Secret<String>) -> Result<String, SignatureError> {
    let mut mac = new_mac(secret)?;
    mac.update(signature_message(order_id, payment_id).as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Checks that `signature` was issued by the holder of `secret` for exactly this order and payment.
///
/// Missing inputs are reported before the secret is consulted, so an unconfigured server still rejects incomplete
/// requests as client errors.
pub fn verify_payment_signature(
    order_id: &str,
    payment_id: &str,
    signature: &str,
    secret: &Secret<String>,
) -> Result<(), SignatureError> {
    if order_id.is_empty() || payment_id.is_empty() || signature.is_empty() {
        return Err(SignatureError::MissingFields);
    }
    let mut mac = new_mac(secret)?;
    if signature.len() != SIGNATURE_HEX_LEN || !signature.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
        return Err(SignatureError::InvalidSignature);
    }
    let claimed = hex::decode(signature).map_err(|_| SignatureError::InvalidSignature)?;
    mac.update(signature_message(order_id, payment_id).as_bytes());
    mac.verify_slice(&claimed).map_err(|_| SignatureError::InvalidSignature)
}
