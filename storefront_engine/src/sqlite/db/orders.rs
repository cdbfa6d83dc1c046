use log::debug;
use sqlx::SqliteConnection;
use storefront_common::Paise;

use crate::db_types::{CartLine, NewOrder, Order, OrderItem};

/// Inserts the order header. This is not atomic on its own. Embed this call inside a transaction alongside the
/// stock decrements and item snapshots, passing `&mut *tx` as the connection argument.
pub async fn insert_order(order: NewOrder, total: Paise, conn: &mut SqliteConnection) -> Result<Order, sqlx::Error> {
    let order: Order = sqlx::query_as(
        r#"
            INSERT INTO orders (
                customer_id,
                customer_name,
                email,
                address,
                payment_method,
                total_amount
            ) VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *;
        "#,
    )
    .bind(order.customer_id)
    .bind(order.customer_name)
    .bind(order.email)
    .bind(order.address)
    .bind(order.payment_method.to_string())
    .bind(total)
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Order #{} inserted for customer [{}], total {}", order.id, order.customer_id, order.total_amount);
    Ok(order)
}

/// Writes one immutable item snapshot for the order from the given cart line.
pub async fn insert_order_item(
    order_id: i64,
    line: &CartLine,
    conn: &mut SqliteConnection,
) -> Result<OrderItem, sqlx::Error> {
    let item = sqlx::query_as(
        r#"
            INSERT INTO order_items (order_id, product_id, product_name, image_url, price, quantity)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *;
        "#,
    )
    .bind(order_id)
    .bind(line.product_id)
    .bind(&line.product_name)
    .bind(&line.image_url)
    .bind(line.price)
    .bind(line.quantity)
    .fetch_one(conn)
    .await?;
    Ok(item)
}

pub async fn fetch_order(id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(order)
}

pub async fn fetch_order_by_gateway_order_id(
    gateway_order_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE gateway_order_id = $1")
        .bind(gateway_order_id)
        .fetch_optional(conn)
        .await?;
    Ok(order)
}

pub async fn fetch_order_items(order_id: i64, conn: &mut SqliteConnection) -> Result<Vec<OrderItem>, sqlx::Error> {
    let items =
        sqlx::query_as("SELECT * FROM order_items WHERE order_id = $1 ORDER BY id").bind(order_id).fetch_all(conn).await?;
    Ok(items)
}

pub async fn fetch_orders_for_customer(
    customer_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Vec<Order>, sqlx::Error> {
    let orders = sqlx::query_as("SELECT * FROM orders WHERE customer_id = $1 ORDER BY created_at DESC, id DESC")
        .bind(customer_id)
        .fetch_all(conn)
        .await?;
    Ok(orders)
}

pub async fn set_gateway_order_id(
    id: i64,
    gateway_order_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as(
        "UPDATE orders SET gateway_order_id = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 RETURNING *",
    )
    .bind(gateway_order_id)
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(order)
}

/// Records the payment id reported by the client verify call, but only if none is set yet. Statuses are untouched;
/// that is the webhook channel's job.
pub async fn record_payment_id_if_absent(
    gateway_order_id: &str,
    gateway_payment_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as(
        r#"
            UPDATE orders
            SET gateway_payment_id = COALESCE(gateway_payment_id, $1), updated_at = CURRENT_TIMESTAMP
            WHERE gateway_order_id = $2
            RETURNING *;
        "#,
    )
    .bind(gateway_payment_id)
    .bind(gateway_order_id)
    .fetch_optional(conn)
    .await?;
    Ok(order)
}

/// Whether any order already carries this gateway payment id. One leg of the reconciliation idempotency check.
pub async fn payment_id_on_any_order(
    gateway_payment_id: &str,
    conn: &mut SqliteConnection,
) -> Result<bool, sqlx::Error> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE gateway_payment_id = $1")
        .bind(gateway_payment_id)
        .fetch_one(conn)
        .await?;
    Ok(count > 0)
}

/// `payment.captured`: funds are secured. The order is approved for fulfilment. If an earlier event already
/// approved the order, `approved_at` keeps its first value.
pub async fn mark_payment_captured(
    id: i64,
    gateway_payment_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as(
        r#"
            UPDATE orders
            SET payment_status = 'Captured',
                order_status = 'Approved',
                gateway_payment_id = $1,
                approved_at = COALESCE(approved_at, CURRENT_TIMESTAMP),
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $2
            RETURNING *;
        "#,
    )
    .bind(gateway_payment_id)
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(order)
}

/// `payment.failed`: the attempt is dead. The order is cancelled; stock is not restored. Re-delivery writes the
/// same terminal values again, so `cancelled_at` keeps its first value.
pub async fn mark_payment_failed(
    id: i64,
    gateway_payment_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as(
        r#"
            UPDATE orders
            SET payment_status = 'Failed',
                order_status = 'Cancelled',
                gateway_payment_id = $1,
                cancelled_at = COALESCE(cancelled_at, CURRENT_TIMESTAMP),
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $2
            RETURNING *;
        "#,
    )
    .bind(gateway_payment_id)
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(order)
}

/// `order.paid`: the gateway's order-level confirmation. Used when no payment-level event was delivered.
pub async fn mark_order_paid(id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as(
        r#"
            UPDATE orders
            SET payment_status = 'Completed',
                order_status = 'Approved',
                approved_at = COALESCE(approved_at, CURRENT_TIMESTAMP),
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $1
            RETURNING *;
        "#,
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(order)
}
