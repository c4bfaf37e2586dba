use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use fest_engine::{helpers::SignatureError, AdminApiError, RegistrationError};
use log::error;
use razorpay_tools::RazorpayApiError;
use thiserror::Error;

/// The message sent for failures the client has no business knowing the details of.
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong!";

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("{0}")]
    BackendError(String),
    #[error("{0}")]
    InvalidRequestBody(String),
    #[error("{0}")]
    ValidationError(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    NoRecordFound(String),
    #[error("Authentication Error. {0}")]
    AuthenticationError(#[from] AuthError),
    #[error("{0}")]
    ConfigurationError(String),
    #[error("{0}")]
    UpstreamError(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
}

impl ServerError {
    /// The text placed in the `error` field of the response body.
    pub fn client_message(&self) -> String {
        match self {
            Self::AuthenticationError(e) => e.to_string(),
            Self::InitializeError(_) | Self::IOError(_) | Self::Unspecified(_) => GENERIC_ERROR_MESSAGE.to_string(),
            _ => self.to_string(),
        }
    }
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::AuthenticationError(e) => match e {
                AuthError::TokenIssueError(_) => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::UNAUTHORIZED,
            },
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::UpstreamError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.status_code().is_server_error() {
            error!("💻️ {self}");
        }
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "success": false, "error": self.client_message() }).to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("No admin token provided")]
    MissingToken,
    #[error("Invalid admin credentials")]
    InvalidToken,
    #[error("Invalid admin password")]
    InvalidPassword,
    #[error("Could not issue an access token. {0}")]
    TokenIssueError(String),
}

impl From<RegistrationError> for ServerError {
    fn from(e: RegistrationError) -> Self {
        match e {
            RegistrationError::Validation(msg) => Self::ValidationError(msg),
            RegistrationError::Conflict => Self::Conflict(e.to_string()),
            RegistrationError::PaymentRequired
            | RegistrationError::InvalidPaymentFormat
            | RegistrationError::InvalidFee
            | RegistrationError::Verification(_) => Self::ValidationError(e.to_string()),
            RegistrationError::Configuration => Self::ConfigurationError(e.to_string()),
            RegistrationError::PersistFailed { ref last, attempts } => {
                error!("💻️ Registration was not saved after {attempts} attempts. {last}");
                Self::BackendError(e.to_string())
            },
            RegistrationError::Store(ref inner) => {
                error!("💻️ Store failure during the duplicate check. {inner}");
                Self::BackendError(e.to_string())
            },
        }
    }
}

impl From<SignatureError> for ServerError {
    fn from(e: SignatureError) -> Self {
        match e {
            SignatureError::ConfigurationError => Self::ConfigurationError(e.to_string()),
            SignatureError::MissingFields | SignatureError::InvalidSignature => Self::ValidationError(e.to_string()),
        }
    }
}

impl From<AdminApiError> for ServerError {
    fn from(e: AdminApiError) -> Self {
        match e {
            AdminApiError::NotFound => Self::NoRecordFound(e.to_string()),
            AdminApiError::InvalidQuery(msg) => Self::ValidationError(msg),
            AdminApiError::Query(inner) => {
                error!("💻️ Admin query failed. {inner}");
                Self::BackendError("Failed to fetch registrations".into())
            },
            AdminApiError::Export(msg) => {
                error!("💻️ Spreadsheet export failed. {msg}");
                Self::BackendError("Failed to export registrations".into())
            },
        }
    }
}

impl From<RazorpayApiError> for ServerError {
    fn from(e: RazorpayApiError) -> Self {
        match e {
            RazorpayApiError::NotConfigured => Self::ConfigurationError(e.client_message()),
            _ => {
                error!("💻️ Payment order could not be created. {e}");
                Self::UpstreamError(e.client_message())
            },
        }
    }
}
