//! The public API of the storefront engine.
//!
//! Each API struct wraps a backend implementing the relevant capability traits and carries the orchestration that
//! does not belong in SQL: [`CartApi`](cart_api::CartApi) for cart storage and the login merge,
//! [`CheckoutApi`](checkout_api::CheckoutApi) for the cart-to-order conversion and order queries, and
//! [`ReconciliationApi`](reconciliation_api::ReconciliationApi) for the webhook audit-and-apply pipeline.
pub mod cart_api;
pub mod checkout_api;
pub mod reconciliation_api;
