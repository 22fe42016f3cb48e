//! Received webhook event log

use shared::models::WebhookEvent;
use sqlx::SqlitePool;

/// Insert the event unless its id was seen before. Returns `true` when
/// this call created the row.
pub async fn insert_if_absent(pool: &SqlitePool, e: &WebhookEvent) -> Result<bool, sqlx::Error> {
    let rows = sqlx::query(
        "INSERT INTO webhook_events (event_id, event_type, payload, received_at, processed_at)
         VALUES (?, ?, ?, ?, NULL) ON CONFLICT (event_id) DO NOTHING",
    )
    .bind(&e.event_id)
    .bind(&e.event_type)
    .bind(&e.payload)
    .bind(e.received_at)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn find(pool: &SqlitePool, event_id: &str) -> Result<Option<WebhookEvent>, sqlx::Error> {
    sqlx::query_as(
        "SELECT event_id, event_type, payload, received_at, processed_at FROM webhook_events WHERE event_id = ?",
    )
    .bind(event_id)
    .fetch_optional(pool)
    .await
}

pub async fn mark_processed(pool: &SqlitePool, event_id: &str, now: i64) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE webhook_events SET processed_at = ? WHERE event_id = ?")
        .bind(now)
        .bind(event_id)
        .execute(pool)
        .await?;
    Ok(())
}
