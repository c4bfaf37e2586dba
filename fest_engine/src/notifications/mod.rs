//! Confirmation mail for new registrations.
//!
//! The engine only renders messages and decides when to retry. Actually delivering them is the job of a
//! [`MessageTransport`] implementation supplied by the caller.
mod confirmation;
mod dispatcher;
mod transport;

pub use confirmation::{confirmation_message, CONFIRMATION_SUBJECT};
pub use dispatcher::{NotificationDispatcher, NotifyError};
pub use transport::{MailMessage, MessageTransport, TransportError};
