//! Invoice header queries

use shared::models::{Invoice, InvoiceStatus, ListQuery};
use sqlx::{SqliteConnection, SqliteExecutor, SqlitePool};

const COLUMNS: &str = "i.id, i.org_id, i.customer_id, i.number, i.issue_date, i.due_date, i.subtotal_cents, i.tax_cents, i.discount_cents, i.total_cents, i.status, i.notes, i.created_at, i.updated_at";

pub async fn insert(conn: &mut SqliteConnection, inv: &Invoice) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO invoices (id, org_id, customer_id, number, issue_date, due_date, subtotal_cents, tax_cents, discount_cents, total_cents, status, notes, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(inv.id)
    .bind(inv.org_id)
    .bind(inv.customer_id)
    .bind(&inv.number)
    .bind(&inv.issue_date)
    .bind(&inv.due_date)
    .bind(inv.subtotal_cents)
    .bind(inv.tax_cents)
    .bind(inv.discount_cents)
    .bind(inv.total_cents)
    .bind(inv.status)
    .bind(&inv.notes)
    .bind(inv.created_at)
    .bind(inv.updated_at)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn find_by_id(
    executor: impl SqliteExecutor<'_>,
    id: i64,
) -> Result<Option<Invoice>, sqlx::Error> {
    sqlx::query_as(&format!("SELECT {COLUMNS} FROM invoices i WHERE i.id = ?"))
        .bind(id)
        .fetch_optional(executor)
        .await
}

/// Take the write lock on an invoice row and bump `updated_at`.
pub async fn touch(conn: &mut SqliteConnection, id: i64, now: i64) -> Result<bool, sqlx::Error> {
    let rows = sqlx::query("UPDATE invoices SET updated_at = ? WHERE id = ?")
        .bind(now)
        .bind(id)
        .execute(conn)
        .await?;
    Ok(rows.rows_affected() > 0)
}

/// Page of invoices in an organization, filtered by number or customer name.
pub async fn list(pool: &SqlitePool, q: &ListQuery) -> Result<(Vec<Invoice>, i64), sqlx::Error> {
    let pattern = q.like_pattern();
    let from = "FROM invoices i JOIN customers c ON c.id = i.customer_id
         WHERE i.org_id = ?1 AND (?2 IS NULL OR lower(i.number) LIKE ?2 ESCAPE '\\' OR lower(c.name) LIKE ?2 ESCAPE '\\')";

    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) {from}"))
        .bind(q.org_id)
        .bind(&pattern)
        .fetch_one(pool)
        .await?;

    let rows = sqlx::query_as(&format!(
        "SELECT {COLUMNS} {from} ORDER BY i.created_at DESC, i.id DESC LIMIT ?3 OFFSET ?4"
    ))
    .bind(q.org_id)
    .bind(&pattern)
    .bind(i64::from(q.limit()))
    .bind(q.offset())
    .fetch_all(pool)
    .await?;

    Ok((rows, total))
}

pub async fn update_header(conn: &mut SqliteConnection, inv: &Invoice) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE invoices SET customer_id = ?, issue_date = ?, due_date = ?, subtotal_cents = ?, tax_cents = ?, discount_cents = ?, total_cents = ?, status = ?, notes = ?, updated_at = ?
         WHERE id = ?",
    )
    .bind(inv.customer_id)
    .bind(&inv.issue_date)
    .bind(&inv.due_date)
    .bind(inv.subtotal_cents)
    .bind(inv.tax_cents)
    .bind(inv.discount_cents)
    .bind(inv.total_cents)
    .bind(inv.status)
    .bind(&inv.notes)
    .bind(inv.updated_at)
    .bind(inv.id)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn set_status(
    conn: &mut SqliteConnection,
    id: i64,
    status: InvoiceStatus,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE invoices SET status = ?, updated_at = ? WHERE id = ?")
        .bind(status)
        .bind(now)
        .bind(id)
        .execute(conn)
        .await?;
    Ok(())
}

/// Delete an invoice unless it is paid; line items cascade.
/// Returns `false` when nothing was deleted.
pub async fn delete_unpaid(conn: &mut SqliteConnection, id: i64) -> Result<bool, sqlx::Error> {
    let rows = sqlx::query("DELETE FROM invoices WHERE id = ? AND status <> 'paid'")
        .bind(id)
        .execute(conn)
        .await?;
    Ok(rows.rows_affected() > 0)
}
