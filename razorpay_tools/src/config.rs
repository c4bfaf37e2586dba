use fest_common::Secret;
use log::*;

pub const DEFAULT_RAZORPAY_API_URL: &str = "https://api.razorpay.com/v1";

#[derive(Debug, Clone, Default)]
pub struct RazorpayConfig {
    pub key_id: String,
    /// Doubles as the HMAC key for checkout signatures.
    pub key_secret: Secret<String>,
    pub api_base_url: String,
}

impl RazorpayConfig {
    pub fn new(key_id: &str, key_secret: &str) -> Self {
        Self {
            key_id: key_id.to_string(),
            key_secret: Secret::new(key_secret.to_string()),
            api_base_url: DEFAULT_RAZORPAY_API_URL.to_string(),
        }
    }

    pub fn new_from_env_or_default() -> Self {
        let key_id = std::env::var("FEST_RAZORPAY_KEY_ID").unwrap_or_else(|_| {
            error!("🪛️ FEST_RAZORPAY_KEY_ID not set. Payment orders cannot be created.");
            String::default()
        });
        let key_secret = Secret::new(std::env::var("FEST_RAZORPAY_KEY_SECRET").unwrap_or_else(|_| {
            error!("🪛️ FEST_RAZORPAY_KEY_SECRET not set. Payment orders and signature checks will fail.");
            String::default()
        }));
        let api_base_url = std::env::var("FEST_RAZORPAY_API_URL").unwrap_or_else(|_| {
            debug!("🪛️ FEST_RAZORPAY_API_URL not set, using {DEFAULT_RAZORPAY_API_URL}");
            DEFAULT_RAZORPAY_API_URL.to_string()
        });
        Self { key_id, key_secret, api_base_url }
    }

    pub fn is_configured(&self) -> bool {
        !self.key_id.trim().is_empty() && !self.key_secret.is_blank()
    }
}
