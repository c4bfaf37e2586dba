use log::*;
use thiserror::Error;

use crate::{
    db_types::Registration,
    helpers::{retry, RetryError, RetryPolicy},
    notifications::{confirmation_message, MessageTransport, TransportError},
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotifyError {
    /// The transport rejected the message outright. Nothing was retried.
    #[error("{0}")]
    Transport(TransportError),
    #[error("Failed to send email after {attempts} attempts: {last}")]
    NotifyFailed { attempts: u32, last: TransportError },
}

impl From<RetryError<TransportError>> for NotifyError {
    fn from(e: RetryError<TransportError>) -> Self {
        match e {
            RetryError::Aborted(e) => NotifyError::Transport(e),
            RetryError::Exhausted { attempts, last } => NotifyError::NotifyFailed { attempts, last },
        }
    }
}

/// Sends registration confirmations through a [`MessageTransport`], retrying transient send failures.
#[derive(Clone)]
pub struct NotificationDispatcher<T> {
    transport: T,
    policy: RetryPolicy,
}

impl<T> NotificationDispatcher<T> {
    pub fn new(transport: T) -> Self {
        Self { transport, policy: RetryPolicy::for_notifications() }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

impl<T> NotificationDispatcher<T>
where T: MessageTransport
{
    pub async fn notify(&self, registration: &Registration) -> Result<(), NotifyError> {
        let message = confirmation_message(registration);
        let label = format!("📧️ Confirmation mail for registration #{}", registration.registration_id);
        retry(self.policy, &label, TransportError::is_transient, |_| self.transport.send(message.clone())).await?;
        info!("📧️ Confirmation sent to {} for registration #{}", message.to, registration.registration_id);
        Ok(())
    }
}
