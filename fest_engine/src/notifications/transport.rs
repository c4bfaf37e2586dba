use thiserror::Error;

/// A fully rendered e-mail, ready to hand to a transport. The sender is a property of the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Credentials or addresses are missing or malformed. Retrying will not help.
    #[error("Mail transport is not configured: {0}")]
    NotConfigured(String),
    #[error("Invalid message: {0}")]
    InvalidMessage(String),
    /// The relay could not be reached or refused the message this time.
    #[error("Mail could not be sent: {0}")]
    SendFailed(String),
}

impl TransportError {
    pub fn is_transient(&self) -> bool {
        matches!(self, TransportError::SendFailed(_))
    }
}

/// An outbound message channel, such as an SMTP relay.
#[allow(async_fn_in_trait)]
pub trait MessageTransport {
    async fn send(&self, message: MailMessage) -> Result<(), TransportError>;
}
