//! # Request Handlers
//!
//! One module per backend area. Each handler validates its input, builds the
//! typed backend request, and renders the reply through [`crate::respond`].

pub mod auth;
pub mod health;
pub mod orders;
pub mod payments;
pub mod products;
pub mod reminders;
pub mod webhook;

pub use health::health;
