//! Storefront Payment Engine
//!
//! This library contains the core logic for turning a shopping cart into a persisted order and converging the two
//! payment-gateway channels (client verify call and server-to-server webhook) into one consistent order state.
//!
//! The library is divided into three main sections:
//! 1. Database management and control ([`mod@sqlite`]). SQLite is the supported backend. You should never need to
//!    access the database directly; use the public API instead. The exception is the data types used in the
//!    database, which are defined in the [`db_types`] module and are public.
//! 2. The capability traits ([`mod@traits`]). Backends implement these to serve the public API: cart storage,
//!    the atomic checkout transaction, and the webhook audit ledger.
//! 3. The public API ([`mod@store_api`]): [`CartApi`], [`CheckoutApi`] and [`ReconciliationApi`].
pub mod db_types;
pub mod gateway_events;
#[cfg(feature = "sqlite")]
mod sqlite;
pub mod store_api;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use sqlite::{run_migrations, SqliteDatabase};
pub use store_api::{cart_api::CartApi, checkout_api::CheckoutApi, reconciliation_api::ReconciliationApi};
