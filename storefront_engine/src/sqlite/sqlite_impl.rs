//! `SqliteDatabase` is a concrete implementation of a storefront engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`crate::traits`]
//! module.
use std::fmt::Debug;

use log::*;
use sqlx::SqlitePool;

use super::db::{carts, new_pool, orders, products, session_carts, webhook_logs};
use crate::{
    db_types::{CartLine, NewOrder, Order, OrderItem, OrderStatus, PaymentStatus, Product, ShopperId, WebhookLogEntry},
    gateway_events::{EventKind, ProcessingOutcome},
    traits::{
        CartApiError,
        CartManagement,
        CheckoutDatabase,
        CheckoutError,
        ProductCatalog,
        ReconciliationError,
        WebhookLedger,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
    pub(crate) write_pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Reads run on a pool of `max_connections` connections. All mutations go through a separate
    /// single-connection pool: SQLite allows one writer at a time, and a deferred transaction that starts with a
    /// read cannot always upgrade to the write lock once another writer has committed (`SQLITE_BUSY_SNAPSHOT`,
    /// which the busy timeout does not retry). Queueing writers on one connection removes that failure mode.
    pub async fn new(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = new_pool(url, max_connections).await?;
        let write_pool = new_pool(url, 1).await?;
        Ok(Self { url: url.to_string(), pool, write_pool })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl CartManagement for SqliteDatabase {
    async fn fetch_cart(&self, shopper: &ShopperId) -> Result<Vec<CartLine>, CartApiError> {
        let mut conn = self.pool.acquire().await?;
        match shopper {
            ShopperId::Customer(user_id) => Ok(carts::fetch_cart_lines(user_id, &mut conn).await?),
            ShopperId::Guest(session_id) => session_carts::fetch_lines(session_id, &mut conn).await,
        }
    }

    async fn add_cart_item(&self, shopper: &ShopperId, product_id: i64, quantity: i64) -> Result<(), CartApiError> {
        if quantity <= 0 {
            return Ok(());
        }
        let mut tx = self.write_pool.begin().await?;
        let product =
            products::fetch_product(product_id, &mut tx).await?.ok_or(CartApiError::ProductNotFound(product_id))?;
        match shopper {
            ShopperId::Customer(user_id) => {
                let cart_id = carts::fetch_or_create_cart(user_id, &mut tx).await?;
                carts::add_item(cart_id, product_id, quantity, &mut tx).await?;
            },
            ShopperId::Guest(session_id) => {
                let mut lines = session_carts::fetch_lines(session_id, &mut tx).await?;
                match lines.iter_mut().find(|l| l.product_id == product_id) {
                    Some(line) => line.quantity += quantity,
                    None => lines.push(CartLine {
                        product_id,
                        product_name: product.name.clone(),
                        image_url: product.image_url.clone(),
                        price: product.price,
                        quantity,
                    }),
                }
                session_carts::save_lines(session_id, &lines, &mut tx).await?;
            },
        }
        tx.commit().await?;
        debug!("🗃️ Added {quantity} x product #{product_id} ({}) to cart for {shopper}", product.name);
        Ok(())
    }

    async fn remove_cart_item(&self, shopper: &ShopperId, product_id: i64) -> Result<(), CartApiError> {
        let mut tx = self.write_pool.begin().await?;
        match shopper {
            ShopperId::Customer(user_id) => carts::remove_item(user_id, product_id, &mut tx).await?,
            ShopperId::Guest(session_id) => {
                let mut lines = session_carts::fetch_lines(session_id, &mut tx).await?;
                lines.retain(|l| l.product_id != product_id);
                session_carts::save_lines(session_id, &lines, &mut tx).await?;
            },
        }
        tx.commit().await?;
        Ok(())
    }

    async fn increase_cart_item(&self, shopper: &ShopperId, product_id: i64) -> Result<(), CartApiError> {
        let mut tx = self.write_pool.begin().await?;
        match shopper {
            ShopperId::Customer(user_id) => carts::increase_item(user_id, product_id, &mut tx).await?,
            ShopperId::Guest(session_id) => {
                let mut lines = session_carts::fetch_lines(session_id, &mut tx).await?;
                if let Some(line) = lines.iter_mut().find(|l| l.product_id == product_id) {
                    line.quantity += 1;
                    session_carts::save_lines(session_id, &lines, &mut tx).await?;
                }
            },
        }
        tx.commit().await?;
        Ok(())
    }

    async fn decrease_cart_item(&self, shopper: &ShopperId, product_id: i64) -> Result<(), CartApiError> {
        let mut tx = self.write_pool.begin().await?;
        match shopper {
            ShopperId::Customer(user_id) => carts::decrease_item(user_id, product_id, &mut tx).await?,
            ShopperId::Guest(session_id) => {
                let mut lines = session_carts::fetch_lines(session_id, &mut tx).await?;
                if let Some(line) = lines.iter_mut().find(|l| l.product_id == product_id) {
                    line.quantity -= 1;
                    lines.retain(|l| l.quantity > 0);
                    session_carts::save_lines(session_id, &lines, &mut tx).await?;
                }
            },
        }
        tx.commit().await?;
        Ok(())
    }

    async fn clear_cart(&self, shopper: &ShopperId) -> Result<(), CartApiError> {
        let mut conn = self.write_pool.acquire().await?;
        match shopper {
            ShopperId::Customer(user_id) => carts::clear_cart(user_id, &mut conn).await?,
            ShopperId::Guest(session_id) => session_carts::clear(session_id, &mut conn).await?,
        }
        Ok(())
    }

    async fn merge_session_cart(&self, session_id: &str, user_id: &str) -> Result<usize, CartApiError> {
        let mut tx = self.write_pool.begin().await?;
        let lines = session_carts::fetch_lines(session_id, &mut tx).await?;
        if lines.is_empty() {
            return Ok(0);
        }
        let cart_id = carts::fetch_or_create_cart(user_id, &mut tx).await?;
        for line in &lines {
            carts::add_item(cart_id, line.product_id, line.quantity, &mut tx).await?;
        }
        // Clearing inside the transaction is what makes a replayed merge a no-op.
        session_carts::clear(session_id, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Merged {} session cart line(s) from [{session_id}] into cart of [{user_id}]", lines.len());
        Ok(lines.len())
    }
}

impl CheckoutDatabase for SqliteDatabase {
    async fn checkout(&self, shopper: &ShopperId, order: NewOrder) -> Result<(Order, Vec<OrderItem>), CheckoutError> {
        let mut tx = self.write_pool.begin().await?;
        let lines = match shopper {
            ShopperId::Customer(user_id) => carts::fetch_cart_lines(user_id, &mut tx).await?,
            ShopperId::Guest(session_id) => session_carts::fetch_lines(session_id, &mut tx)
                .await
                .map_err(|e| CheckoutError::CartError(e.to_string()))?,
        };
        if lines.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        let total = lines.iter().map(|l| l.price * l.quantity).sum();
        let order = orders::insert_order(order, total, &mut tx).await?;
        let mut items = Vec::with_capacity(lines.len());
        for line in &lines {
            // Conditional decrement; a shortfall anywhere rolls the whole checkout back.
            if !products::try_decrement_stock(line.product_id, line.quantity, &mut tx).await? {
                let err = match products::fetch_product(line.product_id, &mut tx).await? {
                    Some(p) => CheckoutError::InsufficientStock {
                        product_name: p.name,
                        requested: line.quantity,
                        available: p.stock_quantity,
                    },
                    None => CheckoutError::ProductNotFound(line.product_id),
                };
                warn!("🗃️ Checkout for {shopper} aborted: {err}");
                return Err(err);
            }
            items.push(orders::insert_order_item(order.id, line, &mut tx).await?);
        }
        match shopper {
            ShopperId::Customer(user_id) => carts::clear_cart(user_id, &mut tx).await?,
            ShopperId::Guest(session_id) => session_carts::clear(session_id, &mut tx).await?,
        }
        tx.commit().await?;
        info!("🗃️ Order #{} created for {shopper}: {} item(s), total {}", order.id, items.len(), order.total_amount);
        Ok((order, items))
    }

    async fn attach_gateway_order(&self, order_id: i64, gateway_order_id: &str) -> Result<Order, CheckoutError> {
        let mut conn = self.write_pool.acquire().await?;
        let order = orders::set_gateway_order_id(order_id, gateway_order_id, &mut conn)
            .await?
            .ok_or_else(|| CheckoutError::OrderNotFound(order_id.to_string()))?;
        debug!("🗃️ Order #{order_id} is now tracking gateway order [{gateway_order_id}]");
        Ok(order)
    }

    async fn record_verified_payment(
        &self,
        gateway_order_id: &str,
        gateway_payment_id: &str,
    ) -> Result<Order, CheckoutError> {
        let mut conn = self.write_pool.acquire().await?;
        let order = orders::record_payment_id_if_absent(gateway_order_id, gateway_payment_id, &mut conn)
            .await?
            .ok_or_else(|| CheckoutError::OrderNotFound(gateway_order_id.to_string()))?;
        debug!("🗃️ Client-verified payment [{gateway_payment_id}] noted on order #{}", order.id);
        Ok(order)
    }

    async fn fetch_order(&self, order_id: i64) -> Result<Option<Order>, CheckoutError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::fetch_order(order_id, &mut conn).await?)
    }

    async fn fetch_order_by_gateway_order_id(&self, gateway_order_id: &str) -> Result<Option<Order>, CheckoutError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::fetch_order_by_gateway_order_id(gateway_order_id, &mut conn).await?)
    }

    async fn fetch_order_items(&self, order_id: i64) -> Result<Vec<OrderItem>, CheckoutError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::fetch_order_items(order_id, &mut conn).await?)
    }

    async fn fetch_orders_for_customer(&self, customer_key: &str) -> Result<Vec<Order>, CheckoutError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::fetch_orders_for_customer(customer_key, &mut conn).await?)
    }
}

impl ProductCatalog for SqliteDatabase {
    async fn fetch_products(&self) -> Result<Vec<Product>, CheckoutError> {
        let mut conn = self.pool.acquire().await?;
        Ok(products::fetch_products(&mut conn).await?)
    }

    async fn fetch_product(&self, product_id: i64) -> Result<Option<Product>, CheckoutError> {
        let mut conn = self.pool.acquire().await?;
        Ok(products::fetch_product(product_id, &mut conn).await?)
    }
}

impl WebhookLedger for SqliteDatabase {
    async fn record_incoming(
        &self,
        event: &str,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<WebhookLogEntry, ReconciliationError> {
        let mut conn = self.write_pool.acquire().await?;
        let entry = webhook_logs::insert_log(event, payload, signature_header, &mut conn).await?;
        debug!("🗃️ Webhook delivery [{event}] logged as entry #{}", entry.id);
        Ok(entry)
    }

    async fn mark_rejected(&self, log_id: i64, result: &str) -> Result<(), ReconciliationError> {
        let mut conn = self.write_pool.acquire().await?;
        if !webhook_logs::set_rejection_result(log_id, result, &mut conn).await? {
            return Err(ReconciliationError::LogEntryNotFound(log_id));
        }
        warn!("🗃️ Webhook entry #{log_id} rejected: {result}");
        Ok(())
    }

    async fn apply_event(&self, log_id: i64, kind: EventKind) -> Result<ProcessingOutcome, ReconciliationError> {
        let mut tx = self.write_pool.begin().await?;
        let (payment_id, gateway_order_id) = match &kind {
            EventKind::PaymentCaptured(p) | EventKind::PaymentFailed(p) => {
                (Some(p.id.clone()), Some(p.order_id.clone()))
            },
            EventKind::OrderPaid(o) => (None, Some(o.id.clone())),
            EventKind::Refund { refund, .. } => (Some(refund.payment_id.clone()), None),
            EventKind::MissingEntity { .. } | EventKind::Unknown(_) => (None, None),
        };
        let outcome = match kind {
            EventKind::PaymentCaptured(p) => {
                if orders::payment_id_on_any_order(&p.id, &mut tx).await?
                    || webhook_logs::payment_id_on_processed_log(&p.id, &mut tx).await?
                {
                    ProcessingOutcome::AlreadyProcessed(p.id)
                } else {
                    match orders::fetch_order_by_gateway_order_id(&p.order_id, &mut tx).await? {
                        Some(order) => {
                            orders::mark_payment_captured(order.id, &p.id, &mut tx).await?;
                            info!("🗃️ Order #{} approved: payment [{}] captured", order.id, p.id);
                            ProcessingOutcome::PaymentCaptured
                        },
                        None => ProcessingOutcome::OrderNotFound,
                    }
                }
            },
            // No idempotency guard here: a re-delivered failure writes the same terminal values again, and the
            // payment id may already be on the order from the client verify call.
            EventKind::PaymentFailed(p) => match orders::fetch_order_by_gateway_order_id(&p.order_id, &mut tx).await? {
                Some(order) => {
                    orders::mark_payment_failed(order.id, &p.id, &mut tx).await?;
                    info!("🗃️ Order #{} cancelled: payment [{}] failed", order.id, p.id);
                    ProcessingOutcome::PaymentFailed
                },
                None => ProcessingOutcome::OrderNotFound,
            },
            EventKind::OrderPaid(o) => match orders::fetch_order_by_gateway_order_id(&o.id, &mut tx).await? {
                Some(order) => {
                    if order.order_status == OrderStatus::Approved || order.payment_status == PaymentStatus::Captured {
                        ProcessingOutcome::OrderAlreadyPaid
                    } else {
                        orders::mark_order_paid(order.id, &mut tx).await?;
                        info!("🗃️ Order #{} marked paid by order-level confirmation", order.id);
                        ProcessingOutcome::OrderMarkedPaid
                    }
                },
                None => ProcessingOutcome::OrderNotFound,
            },
            EventKind::Refund { event, refund } => {
                info!("🗃️ Refund event [{event}] for payment [{}] recorded, audit only", refund.payment_id);
                ProcessingOutcome::RefundRecorded(refund.id)
            },
            EventKind::MissingEntity { expected } => ProcessingOutcome::MissingEntity(expected),
            EventKind::Unknown(event) => ProcessingOutcome::Ignored(event),
        };
        // Only outcomes that actually landed on an order may enter the idempotency ledger. Closing an
        // OrderNotFound or malformed delivery with its payment id would make a later re-delivery of the same
        // payment look AlreadyProcessed, and the order would never converge.
        let (payment_id, gateway_order_id) = match &outcome {
            ProcessingOutcome::OrderNotFound
            | ProcessingOutcome::MissingEntity(_)
            | ProcessingOutcome::Ignored(_) => (None, None),
            _ => (payment_id, gateway_order_id),
        };
        let closed = webhook_logs::close_log(
            log_id,
            payment_id.as_deref(),
            gateway_order_id.as_deref(),
            &outcome.result_string(),
            &mut tx,
        )
        .await?;
        if !closed {
            return Err(ReconciliationError::LogEntryNotFound(log_id));
        }
        tx.commit().await?;
        Ok(outcome)
    }

    async fn fetch_webhook_log(&self, log_id: i64) -> Result<Option<WebhookLogEntry>, ReconciliationError> {
        let mut conn = self.pool.acquire().await?;
        Ok(webhook_logs::fetch_log(log_id, &mut conn).await?)
    }

    async fn is_payment_processed(&self, gateway_payment_id: &str) -> Result<bool, ReconciliationError> {
        let mut conn = self.pool.acquire().await?;
        let known = orders::payment_id_on_any_order(gateway_payment_id, &mut conn).await?
            || webhook_logs::payment_id_on_processed_log(gateway_payment_id, &mut conn).await?;
        Ok(known)
    }
}
