use crate::db_types::Registration;

/// Published once a registration has been durably stored.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistrationCreatedEvent {
    pub registration: Registration,
}

impl RegistrationCreatedEvent {
    pub fn new(registration: Registration) -> Self {
        Self { registration }
    }
}

/// Published when the confirmation mail could not be delivered after all retries. The registration itself stands.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationFailedEvent {
    pub registration: Registration,
    pub reason: String,
}

impl NotificationFailedEvent {
    pub fn new<S: Into<String>>(registration: Registration, reason: S) -> Self {
        Self { registration, reason: reason.into() }
    }
}
