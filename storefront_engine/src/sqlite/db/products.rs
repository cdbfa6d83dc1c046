use sqlx::SqliteConnection;
use storefront_common::Paise;

use crate::db_types::Product;

pub async fn fetch_products(conn: &mut SqliteConnection) -> Result<Vec<Product>, sqlx::Error> {
    let products = sqlx::query_as("SELECT * FROM products ORDER BY id").fetch_all(conn).await?;
    Ok(products)
}

pub async fn fetch_product(id: i64, conn: &mut SqliteConnection) -> Result<Option<Product>, sqlx::Error> {
    let product = sqlx::query_as("SELECT * FROM products WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(product)
}

/// Decrements the product's stock by `quantity` in a single conditional statement.
///
/// Returns `false` when the row was not updated, i.e. the product does not exist or has less than `quantity` in
/// stock. Because check and decrement are one statement, two concurrent checkouts cannot both take the last unit.
pub async fn try_decrement_stock(id: i64, quantity: i64, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE products SET stock_quantity = stock_quantity - $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 AND \
         stock_quantity >= $1",
    )
    .bind(quantity)
    .bind(id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Inserts a product. Used by seed data and test fixtures.
pub async fn insert_product(
    name: &str,
    image_url: &str,
    price: Paise,
    stock_quantity: i64,
    conn: &mut SqliteConnection,
) -> Result<Product, sqlx::Error> {
    let product = sqlx::query_as(
        "INSERT INTO products (name, image_url, price, stock_quantity) VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(name)
    .bind(image_url)
    .bind(price)
    .bind(stock_quantity)
    .fetch_one(conn)
    .await?;
    Ok(product)
}
