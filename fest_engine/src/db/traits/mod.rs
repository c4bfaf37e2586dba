//! # Store contracts
//!
//! These traits define what a storage backend must provide for the registration service.
//!
//! * [`RegistrationManagement`] is the write side used by the registration pipeline: the duplicate pre-check and
//!   the atomic insert that assigns the human-facing registration number.
//! * [`RegistrationQueries`] is the read-only side used by the admin dashboard: filtered, sorted and paginated
//!   listings plus aggregate statistics.
//!
//! Backends report failures as a [`StoreError`], so that the pipeline can decide what is worth retrying without
//! knowing anything about the driver underneath.
mod errors;
mod registration_management;
mod registration_queries;

pub use errors::StoreError;
pub use registration_management::RegistrationManagement;
pub use registration_queries::RegistrationQueries;
