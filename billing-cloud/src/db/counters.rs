//! Per-organization document counters

use shared::numbering::DocumentKind;
use sqlx::SqliteConnection;

/// Atomically allocate the next sequence value for `(org_id, kind)`.
///
/// The first call for a pair yields 1. Run inside the transaction that
/// inserts the document so a rolled-back create releases its number.
pub async fn next_value(
    conn: &mut SqliteConnection,
    org_id: i64,
    kind: DocumentKind,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        "INSERT INTO document_counters (org_id, kind, last_value) VALUES (?, ?, 1)
         ON CONFLICT (org_id, kind) DO UPDATE SET last_value = last_value + 1
         RETURNING last_value",
    )
    .bind(org_id)
    .bind(kind.as_db())
    .fetch_one(conn)
    .await
}
