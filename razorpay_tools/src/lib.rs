//! Razorpay integration for the storefront payment server.
//!
//! This crate owns everything that talks to, or authenticates messages from, the payment gateway:
//! * [`RazorpayApi`] creates remote gateway orders over the REST API (Basic auth).
//! * [`signature`] holds the HMAC-SHA256 routines for the client-side verify call and for webhook bodies.
//!
//! Nothing in this crate touches the database; order state belongs to `storefront_engine`.
mod api;
mod config;
mod error;

mod data_objects;

pub mod signature;

pub use api::RazorpayApi;
pub use config::RazorpayConfig;
pub use data_objects::{CreateOrderRequest, RemoteOrder};
pub use error::RazorpayApiError;
