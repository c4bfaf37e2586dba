use thiserror::Error;

#[derive(Debug, Error)]
pub enum RazorpayApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Payment gateway credentials are not configured")]
    NotConfigured,
    #[error("Invalid REST response: {0}")]
    RestResponseError(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Gateway request failed. Error {status}. {code}: {description}")]
    QueryError { status: u16, code: String, description: String },
}

impl RazorpayApiError {
    /// The message that is safe to relay to the client that asked for the order. Gateway descriptions are passed
    /// through, since they describe what was wrong with the request (e.g. an amount below the minimum).
    pub fn client_message(&self) -> String {
        match self {
            Self::QueryError { description, .. } if !description.is_empty() => description.clone(),
            Self::NotConfigured => "Payment service configuration error".to_string(),
            _ => "Failed to create order".to_string(),
        }
    }
}
