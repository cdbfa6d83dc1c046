//! Persisted customer carts: a `carts` header row per user, with `cart_items` rows holding product id and
//! quantity only. Display fields (name, image, price) are joined in from the catalog at read time, so a customer
//! cart always shows live prices.
use sqlx::SqliteConnection;

use crate::db_types::CartLine;

pub async fn fetch_or_create_cart(user_id: &str, conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    if let Some(id) =
        sqlx::query_scalar("SELECT id FROM carts WHERE user_id = $1").bind(user_id).fetch_optional(&mut *conn).await?
    {
        return Ok(id);
    }
    let id = sqlx::query_scalar("INSERT INTO carts (user_id) VALUES ($1) RETURNING id")
        .bind(user_id)
        .fetch_one(conn)
        .await?;
    Ok(id)
}

pub async fn fetch_cart_lines(user_id: &str, conn: &mut SqliteConnection) -> Result<Vec<CartLine>, sqlx::Error> {
    let lines = sqlx::query_as(
        r#"
            SELECT p.id AS product_id, p.name AS product_name, p.image_url, p.price, ci.quantity
            FROM cart_items ci
            JOIN carts c ON c.id = ci.cart_id
            JOIN products p ON p.id = ci.product_id
            WHERE c.user_id = $1
            ORDER BY ci.id;
        "#,
    )
    .bind(user_id)
    .fetch_all(conn)
    .await?;
    Ok(lines)
}

/// Adds `quantity` units of the product to the cart, summing into an existing line if there is one.
pub async fn add_item(
    cart_id: i64,
    product_id: i64,
    quantity: i64,
    conn: &mut SqliteConnection,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
            INSERT INTO cart_items (cart_id, product_id, quantity) VALUES ($1, $2, $3)
            ON CONFLICT (cart_id, product_id) DO UPDATE SET quantity = quantity + excluded.quantity;
        "#,
    )
    .bind(cart_id)
    .bind(product_id)
    .bind(quantity)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn remove_item(user_id: &str, product_id: i64, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query(
        "DELETE FROM cart_items WHERE product_id = $1 AND cart_id IN (SELECT id FROM carts WHERE user_id = $2)",
    )
    .bind(product_id)
    .bind(user_id)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn increase_item(user_id: &str, product_id: i64, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE cart_items SET quantity = quantity + 1 WHERE product_id = $1 AND cart_id IN (SELECT id FROM carts \
         WHERE user_id = $2)",
    )
    .bind(product_id)
    .bind(user_id)
    .execute(conn)
    .await?;
    Ok(())
}

/// Decrements the line by one, deleting it when the quantity reaches zero. The CHECK constraint on `quantity`
/// forbids storing a zero, so the delete happens first.
pub async fn decrease_item(user_id: &str, product_id: i64, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query(
        "DELETE FROM cart_items WHERE product_id = $1 AND quantity <= 1 AND cart_id IN (SELECT id FROM carts WHERE \
         user_id = $2)",
    )
    .bind(product_id)
    .bind(user_id)
    .execute(&mut *conn)
    .await?;
    sqlx::query(
        "UPDATE cart_items SET quantity = quantity - 1 WHERE product_id = $1 AND cart_id IN (SELECT id FROM carts \
         WHERE user_id = $2)",
    )
    .bind(product_id)
    .bind(user_id)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn clear_cart(user_id: &str, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM cart_items WHERE cart_id IN (SELECT id FROM carts WHERE user_id = $1)")
        .bind(user_id)
        .execute(conn)
        .await?;
    Ok(())
}
