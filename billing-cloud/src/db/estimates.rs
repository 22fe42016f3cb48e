//! Estimate header queries

use shared::models::{Estimate, EstimateStatus, ListQuery};
use sqlx::{SqliteConnection, SqliteExecutor, SqlitePool};

const COLUMNS: &str = "e.id, e.org_id, e.customer_id, e.number, e.issue_date, e.valid_until, e.subtotal_cents, e.tax_cents, e.discount_cents, e.total_cents, e.status, e.signature_id, e.contract_id, e.notes, e.created_at, e.updated_at";

pub async fn insert(conn: &mut SqliteConnection, e: &Estimate) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO estimates (id, org_id, customer_id, number, issue_date, valid_until, subtotal_cents, tax_cents, discount_cents, total_cents, status, signature_id, contract_id, notes, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(e.id)
    .bind(e.org_id)
    .bind(e.customer_id)
    .bind(&e.number)
    .bind(&e.issue_date)
    .bind(&e.valid_until)
    .bind(e.subtotal_cents)
    .bind(e.tax_cents)
    .bind(e.discount_cents)
    .bind(e.total_cents)
    .bind(e.status)
    .bind(e.signature_id)
    .bind(e.contract_id)
    .bind(&e.notes)
    .bind(e.created_at)
    .bind(e.updated_at)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn find_by_id(
    executor: impl SqliteExecutor<'_>,
    id: i64,
) -> Result<Option<Estimate>, sqlx::Error> {
    sqlx::query_as(&format!("SELECT {COLUMNS} FROM estimates e WHERE e.id = ?"))
        .bind(id)
        .fetch_optional(executor)
        .await
}

/// Take the write lock on an estimate row and bump `updated_at`.
///
/// Run first in a transaction so concurrent writers to the same database
/// serialize before reading state. Returns `false` when the row is gone.
pub async fn touch(conn: &mut SqliteConnection, id: i64, now: i64) -> Result<bool, sqlx::Error> {
    let rows = sqlx::query("UPDATE estimates SET updated_at = ? WHERE id = ?")
        .bind(now)
        .bind(id)
        .execute(conn)
        .await?;
    Ok(rows.rows_affected() > 0)
}

/// Page of estimates in an organization, filtered by number or customer name.
pub async fn list(pool: &SqlitePool, q: &ListQuery) -> Result<(Vec<Estimate>, i64), sqlx::Error> {
    let pattern = q.like_pattern();
    let from = "FROM estimates e JOIN customers c ON c.id = e.customer_id
         WHERE e.org_id = ?1 AND (?2 IS NULL OR lower(e.number) LIKE ?2 ESCAPE '\\' OR lower(c.name) LIKE ?2 ESCAPE '\\')";

    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) {from}"))
        .bind(q.org_id)
        .bind(&pattern)
        .fetch_one(pool)
        .await?;

    let rows = sqlx::query_as(&format!(
        "SELECT {COLUMNS} {from} ORDER BY e.created_at DESC, e.id DESC LIMIT ?3 OFFSET ?4"
    ))
    .bind(q.org_id)
    .bind(&pattern)
    .bind(i64::from(q.limit()))
    .bind(q.offset())
    .fetch_all(pool)
    .await?;

    Ok((rows, total))
}

/// Write the editable header columns of `e`.
pub async fn update_header(conn: &mut SqliteConnection, e: &Estimate) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE estimates SET customer_id = ?, issue_date = ?, valid_until = ?, subtotal_cents = ?, tax_cents = ?, discount_cents = ?, total_cents = ?, status = ?, notes = ?, updated_at = ?
         WHERE id = ?",
    )
    .bind(e.customer_id)
    .bind(&e.issue_date)
    .bind(&e.valid_until)
    .bind(e.subtotal_cents)
    .bind(e.tax_cents)
    .bind(e.discount_cents)
    .bind(e.total_cents)
    .bind(e.status)
    .bind(&e.notes)
    .bind(e.updated_at)
    .bind(e.id)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn set_status(
    conn: &mut SqliteConnection,
    id: i64,
    status: EstimateStatus,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE estimates SET status = ?, updated_at = ? WHERE id = ?")
        .bind(status)
        .bind(now)
        .bind(id)
        .execute(conn)
        .await?;
    Ok(())
}

/// Record acceptance: link signature and contract and move to `accepted`.
pub async fn set_accepted(
    conn: &mut SqliteConnection,
    id: i64,
    signature_id: i64,
    contract_id: i64,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE estimates SET status = 'accepted', signature_id = ?, contract_id = ?, updated_at = ?
         WHERE id = ?",
    )
    .bind(signature_id)
    .bind(contract_id)
    .bind(now)
    .bind(id)
    .execute(conn)
    .await?;
    Ok(())
}

/// Move an accepted estimate to `completed`. Returns `false` if it was not
/// in `accepted`.
pub async fn complete_if_accepted(
    conn: &mut SqliteConnection,
    id: i64,
    now: i64,
) -> Result<bool, sqlx::Error> {
    let rows = sqlx::query(
        "UPDATE estimates SET status = 'completed', updated_at = ? WHERE id = ? AND status = 'accepted'",
    )
    .bind(now)
    .bind(id)
    .execute(conn)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// Delete an estimate; its line items cascade.
pub async fn delete(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let rows = sqlx::query("DELETE FROM estimates WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
