use thiserror::Error;

use crate::{helpers::SignatureError, traits::StoreError};

/// Everything that can stop a registration from being accepted. The `Display` text of each variant is safe to show to
/// the registrant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("{0}")]
    Validation(String),
    #[error("User with this email or phone already registered for this event")]
    Conflict,
    #[error("Payment details are required. Registration cannot proceed without completing payment.")]
    PaymentRequired,
    #[error("Invalid payment details. Please complete payment through the authorized gateway.")]
    InvalidPaymentFormat,
    #[error("Invalid fee amount. Registration requires payment.")]
    InvalidFee,
    #[error("{0}")]
    Verification(SignatureError),
    #[error("Payment configuration error. Please contact support.")]
    Configuration,
    #[error("Failed to register user")]
    PersistFailed { attempts: u32, last: StoreError },
    #[error("Failed to check duplicate registration")]
    Store(StoreError),
}

impl From<SignatureError> for RegistrationError {
    fn from(e: SignatureError) -> Self {
        match e {
            SignatureError::MissingFields => RegistrationError::PaymentRequired,
            SignatureError::ConfigurationError => RegistrationError::Configuration,
            SignatureError::InvalidSignature => RegistrationError::Verification(e),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdminApiError {
    #[error("No registrations found for the given criteria")]
    NotFound,
    #[error("{0}")]
    InvalidQuery(String),
    #[error("Failed to fetch registrations. {0}")]
    Query(StoreError),
    #[error("Failed to export registrations. {0}")]
    Export(String),
}

impl From<StoreError> for AdminApiError {
    fn from(e: StoreError) -> Self {
        AdminApiError::Query(e)
    }
}
