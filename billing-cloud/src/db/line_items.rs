//! Line item queries for both document kinds
//!
//! Estimate and invoice lines live in separate tables with the same shape;
//! [`DocumentKind`] selects the table.

use shared::models::{LineItem, LineItemInput};
use shared::numbering::DocumentKind;
use shared::util::snowflake_id;
use sqlx::{SqliteConnection, SqliteExecutor};

fn table(kind: DocumentKind) -> (&'static str, &'static str) {
    match kind {
        DocumentKind::Estimate => ("estimate_line_items", "estimate_id"),
        DocumentKind::Invoice => ("invoice_line_items", "invoice_id"),
    }
}

pub async fn list(
    executor: impl SqliteExecutor<'_>,
    kind: DocumentKind,
    document_id: i64,
) -> Result<Vec<LineItem>, sqlx::Error> {
    let (table, fk) = table(kind);
    sqlx::query_as(&format!(
        "SELECT id, {fk} AS document_id, position, description, additional_details, quantity, unit_cents, amount_cents
         FROM {table} WHERE {fk} = ? ORDER BY position"
    ))
    .bind(document_id)
    .fetch_all(executor)
    .await
}

/// Insert `lines` in order. Amounts must already be validated.
pub async fn insert_all(
    conn: &mut SqliteConnection,
    kind: DocumentKind,
    document_id: i64,
    lines: &[(LineItemInput, i64)],
) -> Result<(), sqlx::Error> {
    let (table, fk) = table(kind);
    let sql = format!(
        "INSERT INTO {table} (id, {fk}, position, description, additional_details, quantity, unit_cents, amount_cents)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)"
    );
    for (position, (line, amount_cents)) in lines.iter().enumerate() {
        sqlx::query(&sql)
            .bind(snowflake_id())
            .bind(document_id)
            .bind(position as i64)
            .bind(line.description.trim())
            .bind(&line.additional_details)
            .bind(line.quantity)
            .bind(line.unit_cents)
            .bind(amount_cents)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

/// Delete every line of the document and insert `lines` in its place.
pub async fn replace_all(
    conn: &mut SqliteConnection,
    kind: DocumentKind,
    document_id: i64,
    lines: &[(LineItemInput, i64)],
) -> Result<(), sqlx::Error> {
    let (table, fk) = table(kind);
    sqlx::query(&format!("DELETE FROM {table} WHERE {fk} = ?"))
        .bind(document_id)
        .execute(&mut *conn)
        .await?;
    insert_all(conn, kind, document_id, lines).await
}
