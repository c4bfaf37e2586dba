//! A thin client for the parts of the Razorpay REST API that the registration service needs: creating an order that
//! the checkout widget can then charge against.
//!
//! The [`OrderIssuer`] trait is the seam the HTTP server depends on, so that tests can swap in a mock gateway.
mod api;
mod config;
mod error;

mod data_objects;

pub use api::{OrderIssuer, RazorpayApi};
pub use config::RazorpayConfig;
pub use data_objects::{GatewayErrorBody, GatewayErrorDetail, NewOrder, RazorpayOrder};
pub use error::RazorpayApiError;

/// Prefix of every payment id issued by the gateway.
pub const PAYMENT_ID_PREFIX: &str = "pay_";
/// Prefix of every order id issued by the gateway.
pub const ORDER_ID_PREFIX: &str = "order_";
