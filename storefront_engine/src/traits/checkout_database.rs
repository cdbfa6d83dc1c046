use thiserror::Error;

use crate::db_types::{NewOrder, Order, OrderItem, ShopperId};

#[derive(Debug, Clone, Error)]
pub enum CheckoutError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("The cart is empty; there is nothing to check out")]
    EmptyCart,
    #[error("Product {0} no longer exists")]
    ProductNotFound(i64),
    #[error("Insufficient stock for {product_name}: requested {requested}, available {available}")]
    InsufficientStock { product_name: String, requested: i64, available: i64 },
    #[error("Order {0} not found")]
    OrderNotFound(String),
    #[error("Could not read the shopper's cart: {0}")]
    CartError(String),
}

impl From<sqlx::Error> for CheckoutError {
    fn from(e: sqlx::Error) -> Self {
        CheckoutError::DatabaseError(e.to_string())
    }
}

/// The `CheckoutDatabase` trait owns the cart-to-order conversion and the order-side bookkeeping of the payment
/// flow. The conversion is a single atomic transaction: the order and its item snapshots appear, stock is
/// decremented and the cart is emptied together, or nothing happens at all.
#[allow(async_fn_in_trait)]
pub trait CheckoutDatabase {
    /// Converts the shopper's cart into a persisted order, atomically.
    ///
    /// In one transaction:
    /// * the order header is inserted as `Pending`/`Pending` with the cart's total,
    /// * each cart line's stock is checked and decremented; a shortfall anywhere aborts the whole transaction,
    /// * an immutable [`OrderItem`] snapshot is written per line,
    /// * the shopper's cart is cleared.
    ///
    /// Returns the new order and its item snapshots.
    async fn checkout(&self, shopper: &ShopperId, order: NewOrder) -> Result<(Order, Vec<OrderItem>), CheckoutError>;

    /// Records the gateway's order id against a local order, once a remote order has been created for it.
    async fn attach_gateway_order(&self, order_id: i64, gateway_order_id: &str) -> Result<Order, CheckoutError>;

    /// Records the gateway payment id reported by the *client* verify call against the order matching
    /// `gateway_order_id`.
    ///
    /// This is deliberately all it does. The client channel is tentative: order and payment status only ever
    /// move on the authority of the webhook channel, and an already-set payment id is never overwritten.
    async fn record_verified_payment(
        &self,
        gateway_order_id: &str,
        gateway_payment_id: &str,
    ) -> Result<Order, CheckoutError>;

    async fn fetch_order(&self, order_id: i64) -> Result<Option<Order>, CheckoutError>;

    async fn fetch_order_by_gateway_order_id(&self, gateway_order_id: &str) -> Result<Option<Order>, CheckoutError>;

    async fn fetch_order_items(&self, order_id: i64) -> Result<Vec<OrderItem>, CheckoutError>;

    /// All orders placed under the given customer key, newest first.
    async fn fetch_orders_for_customer(&self, customer_key: &str) -> Result<Vec<Order>, CheckoutError>;
}
