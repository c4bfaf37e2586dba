use std::fmt::Display;

use fest_engine::registration_objects::RegistrationOutcome;
use razorpay_tools::{NewOrder, RazorpayOrder};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::ServerError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }
}

/// The `{"success": true, "data": ...}` envelope used by the admin read endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { success: true, data }
    }
}

//-------------------------------------------------  Payment orders  ---------------------------------------------------
/// The raw order request. Fields are optional here so that the handler can name what is missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderRequest {
    pub amount: Option<Value>,
    pub currency: Option<String>,
    pub receipt: Option<String>,
}

impl OrderRequest {
    pub fn validate(self) -> Result<NewOrder, ServerError> {
        let missing = || ServerError::ValidationError("Missing required fields: amount, currency, receipt".into());
        let currency = self.currency.filter(|s| !s.trim().is_empty()).ok_or_else(missing)?;
        let receipt = self.receipt.filter(|s| !s.trim().is_empty()).ok_or_else(missing)?;
        let amount = match self.amount {
            None | Some(Value::Null) => return Err(missing()),
            Some(v) => v,
        };
        let invalid = || ServerError::ValidationError("Invalid amount. Must be a positive number".into());
        // Amounts are in the currency's minor unit, so anything fractional is rejected too.
        let amount = amount.as_u64().filter(|a| *a > 0).ok_or_else(invalid)?;
        Ok(NewOrder::new(amount, currency.trim(), receipt.trim()))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderResponse {
    pub success: bool,
    pub order: RazorpayOrder,
}

//-------------------------------------------------  Registration  -----------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationResponse {
    pub success: bool,
    pub message: String,
    pub registration_id: i64,
    /// Only present, as `false`, when the confirmation mail could not be delivered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_sent: Option<bool>,
}

impl From<&RegistrationOutcome> for RegistrationResponse {
    fn from(outcome: &RegistrationOutcome) -> Self {
        Self {
            success: true,
            message: "Registration successful".into(),
            registration_id: outcome.registration.registration_id,
            notification_sent: (!outcome.notification_sent).then_some(false),
        }
    }
}

//-------------------------------------------------  Admin  ------------------------------------------------------------
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
}

impl LoginResponse {
    pub fn new(token: String) -> Self {
        Self { success: true, message: "Admin authenticated successfully".into(), token }
    }
}
