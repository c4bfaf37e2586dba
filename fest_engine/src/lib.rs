//! Festival Registration Engine
//!
//! This library holds the core logic of the tech-fest registration service. It knows nothing about HTTP; the server
//! crate wraps it.
//!
//! The library is divided into these sections:
//! 1. Storage ([`traits`] and the Sqlite backend). The store assigns registration numbers atomically and enforces
//!    that an email or mobile number can register for a given event only once. The data types are defined in
//!    [`db_types`] and are public.
//! 2. The public API ([`RegistrationFlowApi`] and [`AdminApi`]). The registration flow accepts a submission only once
//!    the payment gateway's signature checks out, and then stores it and sends a confirmation mail.
//! 3. [`notifications`], which renders the confirmation mail and retries delivery through a pluggable transport.
//!
//! The engine also emits events when a registration is stored, or when its confirmation mail could not be delivered.
//! See [`events`] for how to hook into them.
mod db;

pub mod db_types;
pub mod events;
pub mod helpers;
pub mod notifications;

mod fest_api;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use db::traits;
#[cfg(feature = "sqlite")]
pub use db::sqlite::{db_url, SqliteDatabase, SqliteDatabaseError};
pub use fest_api::{
    admin_api::AdminApi,
    admin_objects,
    errors::{AdminApiError, RegistrationError},
    export,
    registration_flow_api::RegistrationFlowApi,
    registration_objects,
};
pub use traits::{RegistrationManagement, RegistrationQueries, StoreError};
