//! SMTP delivery of confirmation mails, using a STARTTLS relay.
use fest_engine::notifications::{MailMessage, MessageTransport, TransportError};
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    Address,
    AsyncSmtpTransport,
    AsyncTransport,
    Message,
    Tokio1Executor,
};
use log::*;

use crate::config::MailConfig;

#[derive(Clone)]
pub struct SmtpMailer {
    relay: Option<Relay>,
}

#[derive(Clone)]
struct Relay {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Builds a mailer from the configuration. If credentials are missing or the sender address is malformed, the
    /// mailer is still created, but every send fails with [`TransportError::NotConfigured`].
    pub fn new(config: &MailConfig) -> Self {
        match Self::build_relay(config) {
            Ok(relay) => {
                info!("📧️ Mail relay configured: {}:{}", config.smtp_host, config.smtp_port);
                Self { relay: Some(relay) }
            },
            Err(e) => {
                error!("📧️ Confirmation mails are disabled. {e}");
                Self { relay: None }
            },
        }
    }

    pub fn is_configured(&self) -> bool {
        self.relay.is_some()
    }

    fn build_relay(config: &MailConfig) -> Result<Relay, TransportError> {
        if !config.is_configured() {
            return Err(TransportError::NotConfigured("SMTP host, user and password are all required".into()));
        }
        let address = config
            .smtp_user
            .trim()
            .parse::<Address>()
            .map_err(|e| TransportError::NotConfigured(format!("{} is not a valid sender address. {e}", config.smtp_user)))?;
        let from = Mailbox::new(Some(config.from_name.clone()), address);
        let credentials = Credentials::new(config.smtp_user.clone(), config.smtp_password.reveal().clone());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| TransportError::NotConfigured(e.to_string()))?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();
        Ok(Relay { transport, from })
    }
}

impl MessageTransport for SmtpMailer {
    async fn send(&self, message: MailMessage) -> Result<(), TransportError> {
        let relay = self
            .relay
            .as_ref()
            .ok_or_else(|| TransportError::NotConfigured("no mail relay has been configured".into()))?;
        let to = message
            .to
            .parse::<Mailbox>()
            .map_err(|e| TransportError::InvalidMessage(format!("{} is not a valid recipient. {e}", message.to)))?;
        let email = Message::builder()
            .from(relay.from.clone())
            .to(to)
            .subject(message.subject)
            .header(ContentType::TEXT_HTML)
            .body(message.html_body)
            .map_err(|e| TransportError::InvalidMessage(e.to_string()))?;
        let response = AsyncTransport::send(&relay.transport, email).await.map_err(|e| {
            warn!("📧️ SMTP relay refused the message to {}. {e}", message.to);
            if e.is_permanent() {
                TransportError::InvalidMessage(e.to_string())
            } else {
                TransportError::SendFailed(e.to_string())
            }
        })?;
        debug!("📧️ Relay accepted the message to {}. {:?}", message.to, response.code());
        Ok(())
    }
}
