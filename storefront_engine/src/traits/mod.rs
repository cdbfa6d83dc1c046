//! # Backend capability contracts.
//!
//! This module defines the interface contracts a database backend must expose to drive the storefront engine.
//! Each trait covers one capability, and the public API structs in [`crate::store_api`] are generic over them:
//!
//! * [`CartManagement`] stores and mutates shopper carts, for both anonymous sessions and signed-in customers,
//!   including the one-way merge that runs at login.
//! * [`CheckoutDatabase`] owns the atomic cart-to-order transaction and the order state transitions driven by
//!   payment reconciliation.
//! * [`ProductCatalog`] provides read access to the product table.
//! * [`WebhookLedger`] is the append-only audit trail for inbound gateway deliveries and, through it, the
//!   idempotency ledger for the reconciliation engine.
mod cart_management;
mod checkout_database;
mod product_catalog;
mod webhook_ledger;

pub use cart_management::{CartApiError, CartManagement};
pub use checkout_database::{CheckoutDatabase, CheckoutError};
pub use product_catalog::ProductCatalog;
pub use webhook_ledger::{ReconciliationError, WebhookLedger};
