use crate::{
    db_types::{NewRegistration, Registration},
    traits::StoreError,
};

/// Write-side contract of the registration store.
#[allow(async_fn_in_trait)]
pub trait RegistrationManagement {
    /// True if a registration for `event` already uses `email` or `mobile`. All three arguments are expected to be
    /// normalised already (see [`crate::helpers::normalise_email`] and [`crate::db_types::event_key`]).
    async fn registration_exists(&self, event: &str, email: &str, mobile: &str) -> Result<bool, StoreError>;

    /// Stores the registration and its team members in a single atomic write.
    ///
    /// The next registration number (one more than the current maximum, or 1001 for the very first registration)
    /// is allocated as part of the same write, so two concurrent inserts can never receive the same number.
    /// A collision with an existing registration for the same event and email or mobile yields
    /// [`StoreError::Conflict`].
    async fn insert_registration(&self, registration: NewRegistration) -> Result<Registration, StoreError>;
}
