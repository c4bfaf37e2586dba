//! # Registration service API
//!
//! * [`registration_flow_api`] is the payment-gated registration pipeline: duplicate guard, payment verification,
//!   persistence and the confirmation mail.
//! * [`admin_api`] is the read-only side used by the organisers: listings, spreadsheet export and statistics.
//!
//! Both APIs are created by supplying a backend that implements the matching store trait:
//!
//! ```rust,ignore
//! use fest_engine::{AdminApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url("sqlite://data/fest.db", 5).await?;
//! // SqliteDatabase implements RegistrationQueries
//! let api = AdminApi::new(db);
//! let stats = api.statistics().await?;
//! ```
pub mod admin_api;
pub mod admin_objects;
pub mod errors;
pub mod export;
pub mod registration_flow_api;
pub mod registration_objects;
