use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    /// Amount in the smallest currency unit (paise for INR).
    pub amount: u64,
    pub currency: String,
    pub receipt: String,
    /// 1 asks the gateway to capture the payment automatically once it is authorised.
    pub payment_capture: u8,
}

impl NewOrder {
    pub fn new(amount: u64, currency: &str, receipt: &str) -> Self {
        Self { amount, currency: currency.to_string(), receipt: receipt.to_string(), payment_capture: 1 }
    }
}

/// An order as returned by the gateway. It is relayed to the browser unchanged, since the checkout widget needs it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RazorpayOrder {
    pub id: String,
    #[serde(default)]
    pub entity: String,
    pub amount: u64,
    #[serde(default)]
    pub amount_paid: u64,
    #[serde(default)]
    pub amount_due: u64,
    pub currency: String,
    #[serde(default)]
    pub receipt: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub attempts: u32,
    #[serde(default)]
    pub notes: Value,
    #[serde(default)]
    pub created_at: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayErrorBody {
    pub error: GatewayErrorDetail,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GatewayErrorDetail {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub description: String,
    pub source: Option<String>,
    pub step: Option<String>,
    pub reason: Option<String>,
}
