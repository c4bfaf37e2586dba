//! Primitives shared by every crate in the festival registration workspace.
//!
//! * [`Secret`] keeps credentials out of log output.
//! * [`Rupees`] is the money type used for registration fees and revenue figures.
//! * [`helpers`] holds small parsing utilities for environment-driven configuration.
pub mod helpers;
mod rupees;
mod secret;

pub use rupees::{Rupees, RupeesConversionError};
pub use secret::Secret;
