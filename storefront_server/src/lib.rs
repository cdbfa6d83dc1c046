//! # Storefront payment server
//! This module hosts the HTTP surface of the storefront. It is responsible for:
//! * Cart endpoints for guests and signed-in customers, including the merge that runs at login.
//! * The checkout endpoint that converts a cart into an order and registers it with the payment gateway.
//! * The client payment-verify endpoint (tentative confirmation).
//! * The gateway webhook endpoint (authoritative confirmation), which logs every delivery before verifying it.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
pub mod auth;
pub mod config;
pub mod data_objects;
pub mod errors;

pub mod routes;
pub mod server;

pub mod webhook_routes;

#[cfg(test)]
mod endpoint_tests;
