use sqlx::SqliteConnection;

use crate::db_types::WebhookLogEntry;

/// Inserts the raw delivery with `processed = false`. This runs before anyone has looked at the signature.
pub async fn insert_log(
    event: &str,
    payload: &[u8],
    signature_header: &str,
    conn: &mut SqliteConnection,
) -> Result<WebhookLogEntry, sqlx::Error> {
    let entry = sqlx::query_as(
        "INSERT INTO webhook_logs (event, payload, signature_header) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(event)
    .bind(payload)
    .bind(signature_header)
    .fetch_one(conn)
    .await?;
    Ok(entry)
}

pub async fn fetch_log(id: i64, conn: &mut SqliteConnection) -> Result<Option<WebhookLogEntry>, sqlx::Error> {
    let entry = sqlx::query_as("SELECT * FROM webhook_logs WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(entry)
}

/// Records a rejection (bad signature). The entry is closed with the rejection result; no gateway ids are
/// extracted, so it never enters the idempotency check.
pub async fn set_rejection_result(id: i64, result: &str, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let updated = sqlx::query("UPDATE webhook_logs SET processed = 1, processing_result = $1 WHERE id = $2")
        .bind(result)
        .bind(id)
        .execute(conn)
        .await?;
    Ok(updated.rows_affected() > 0)
}

/// Closes out a processed delivery: marks it processed and records the extracted gateway ids and the outcome.
pub async fn close_log(
    id: i64,
    gateway_payment_id: Option<&str>,
    gateway_order_id: Option<&str>,
    result: &str,
    conn: &mut SqliteConnection,
) -> Result<bool, sqlx::Error> {
    let updated = sqlx::query(
        r#"
            UPDATE webhook_logs
            SET processed = 1, gateway_payment_id = $1, gateway_order_id = $2, processing_result = $3
            WHERE id = $4;
        "#,
    )
    .bind(gateway_payment_id)
    .bind(gateway_order_id)
    .bind(result)
    .bind(id)
    .execute(conn)
    .await?;
    Ok(updated.rows_affected() > 0)
}

/// Whether a *processed* delivery already carries this gateway payment id. The other leg of the reconciliation
/// idempotency check; the current delivery (still unprocessed) never matches itself.
pub async fn payment_id_on_processed_log(
    gateway_payment_id: &str,
    conn: &mut SqliteConnection,
) -> Result<bool, sqlx::Error> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM webhook_logs WHERE gateway_payment_id = $1 AND processed = 1")
            .bind(gateway_payment_id)
            .fetch_one(conn)
            .await?;
    Ok(count > 0)
}
