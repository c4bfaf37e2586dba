//! # Discovery ADCET registration server
//! This crate hosts the HTTP surface of the tech-fest registration service. It is responsible for:
//! * Opening payment orders with the gateway for the registration form.
//! * Accepting paid registrations, and handing them to the registration pipeline in `fest_engine`.
//! * Serving the organisers' dashboard: login, the registration list, statistics and spreadsheet export.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/`: A banner, so that a browser pointed at the server shows something.
//! * `POST /api/order`: Opens a payment order with the gateway.
//! * `POST /api/register`: Registers a paid submission.
//! * `POST /api/payment-verification`: Checks a payment signature without registering anything.
//! * `POST /api/admin/login`: Exchanges the shared admin password for a bearer token.
//! * `GET /api/admin/registrations`, `GET /api/admin/export`, `GET /api/admin/stats`: The dashboard endpoints. These
//!   require `Authorization: Bearer <token>`.

pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod integrations;
pub mod middleware;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
