//! Guest session carts: one row per anonymous session, the whole cart serialized as a JSON array of lines.
//! The stored lines snapshot name, image and price at the moment the guest added the product.
use sqlx::SqliteConnection;

use crate::{db_types::CartLine, traits::CartApiError};

pub async fn fetch_lines(session_id: &str, conn: &mut SqliteConnection) -> Result<Vec<CartLine>, CartApiError> {
    let items: Option<String> = sqlx::query_scalar("SELECT items FROM session_carts WHERE session_id = $1")
        .bind(session_id)
        .fetch_optional(conn)
        .await?;
    match items {
        Some(json) => serde_json::from_str(&json).map_err(|e| CartApiError::CorruptSessionCart(e.to_string())),
        None => Ok(Vec::new()),
    }
}

pub async fn save_lines(
    session_id: &str,
    lines: &[CartLine],
    conn: &mut SqliteConnection,
) -> Result<(), CartApiError> {
    let json = serde_json::to_string(lines).map_err(|e| CartApiError::CorruptSessionCart(e.to_string()))?;
    sqlx::query(
        r#"
            INSERT INTO session_carts (session_id, items, updated_at) VALUES ($1, $2, CURRENT_TIMESTAMP)
            ON CONFLICT (session_id) DO UPDATE SET items = excluded.items, updated_at = CURRENT_TIMESTAMP;
        "#,
    )
    .bind(session_id)
    .bind(json)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn clear(session_id: &str, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM session_carts WHERE session_id = $1").bind(session_id).execute(conn).await?;
    Ok(())
}
