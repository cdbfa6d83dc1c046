use log::*;

use crate::{
    db_types::{NewOrder, Order, OrderItem, Product, ShopperId},
    traits::{CheckoutDatabase, CheckoutError, ProductCatalog},
};

/// The cart-to-order conversion and order-side queries.
#[derive(Debug, Clone)]
pub struct CheckoutApi<B> {
    db: B,
}

impl<B> CheckoutApi<B>
where B: CheckoutDatabase + ProductCatalog
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Converts the shopper's cart into a persisted order. The whole conversion is one transaction in the backend:
    /// order, item snapshots, stock decrements and cart clearing land together or not at all.
    pub async fn place_order(
        &self,
        shopper: &ShopperId,
        order: NewOrder,
    ) -> Result<(Order, Vec<OrderItem>), CheckoutError> {
        let (order, items) = self.db.checkout(shopper, order).await?;
        info!("🛒 {shopper} checked out order #{} ({} for {} item(s))", order.id, order.total_amount, items.len());
        Ok((order, items))
    }

    /// Records the gateway order id once a remote order has been created for the local one.
    pub async fn attach_gateway_order(&self, order_id: i64, gateway_order_id: &str) -> Result<Order, CheckoutError> {
        self.db.attach_gateway_order(order_id, gateway_order_id).await
    }

    /// Handles the client's post-payment verify call. Only the gateway payment id is recorded; order and payment
    /// status do not move until the webhook channel confirms.
    pub async fn record_verified_payment(
        &self,
        gateway_order_id: &str,
        gateway_payment_id: &str,
    ) -> Result<Order, CheckoutError> {
        self.db.record_verified_payment(gateway_order_id, gateway_payment_id).await
    }

    pub async fn order(&self, order_id: i64) -> Result<Option<Order>, CheckoutError> {
        self.db.fetch_order(order_id).await
    }

    pub async fn order_by_gateway_order_id(&self, gateway_order_id: &str) -> Result<Option<Order>, CheckoutError> {
        self.db.fetch_order_by_gateway_order_id(gateway_order_id).await
    }

    pub async fn order_items(&self, order_id: i64) -> Result<Vec<OrderItem>, CheckoutError> {
        self.db.fetch_order_items(order_id).await
    }

    pub async fn orders_for_customer(&self, customer_key: &str) -> Result<Vec<Order>, CheckoutError> {
        self.db.fetch_orders_for_customer(customer_key).await
    }

    pub async fn products(&self) -> Result<Vec<Product>, CheckoutError> {
        self.db.fetch_products().await
    }

    pub async fn product(&self, product_id: i64) -> Result<Option<Product>, CheckoutError> {
        self.db.fetch_product(product_id).await
    }
}
