//! Split-payment ledger queries
//!
//! Rows move `pending -> open -> paid` and are never deleted.

use shared::models::{InvoiceRecord, SplitKind};
use sqlx::{SqliteConnection, SqliteExecutor};

const SELECT: &str = "SELECT id, estimate_id, kind, stripe_invoice_id, hosted_url, amount_cents, application_fee_cents, status, idempotency_key, created_at, updated_at FROM invoice_records";

pub async fn insert(conn: &mut SqliteConnection, r: &InvoiceRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO invoice_records (id, estimate_id, kind, stripe_invoice_id, hosted_url, amount_cents, application_fee_cents, status, idempotency_key, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(r.id)
    .bind(r.estimate_id)
    .bind(r.kind)
    .bind(&r.stripe_invoice_id)
    .bind(&r.hosted_url)
    .bind(r.amount_cents)
    .bind(r.application_fee_cents)
    .bind(r.status)
    .bind(&r.idempotency_key)
    .bind(r.created_at)
    .bind(r.updated_at)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn find_by_id(
    executor: impl SqliteExecutor<'_>,
    id: i64,
) -> Result<Option<InvoiceRecord>, sqlx::Error> {
    sqlx::query_as(&format!("{SELECT} WHERE id = ?"))
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn find_by_estimate_kind(
    executor: impl SqliteExecutor<'_>,
    estimate_id: i64,
    kind: SplitKind,
) -> Result<Option<InvoiceRecord>, sqlx::Error> {
    sqlx::query_as(&format!("{SELECT} WHERE estimate_id = ? AND kind = ?"))
        .bind(estimate_id)
        .bind(kind)
        .fetch_optional(executor)
        .await
}

pub async fn find_by_stripe_invoice(
    executor: impl SqliteExecutor<'_>,
    stripe_invoice_id: &str,
) -> Result<Option<InvoiceRecord>, sqlx::Error> {
    sqlx::query_as(&format!("{SELECT} WHERE stripe_invoice_id = ?"))
        .bind(stripe_invoice_id)
        .fetch_optional(executor)
        .await
}

/// Ledger of an estimate, deposit first
pub async fn list_by_estimate(
    executor: impl SqliteExecutor<'_>,
    estimate_id: i64,
) -> Result<Vec<InvoiceRecord>, sqlx::Error> {
    sqlx::query_as(&format!(
        "{SELECT} WHERE estimate_id = ? ORDER BY CASE kind WHEN 'deposit' THEN 0 ELSE 1 END, created_at"
    ))
    .bind(estimate_id)
    .fetch_all(executor)
    .await
}

/// Store the remote invoice id as soon as it is known.
pub async fn set_stripe_invoice(
    executor: impl SqliteExecutor<'_>,
    id: i64,
    stripe_invoice_id: &str,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE invoice_records SET stripe_invoice_id = ?, updated_at = ? WHERE id = ?")
        .bind(stripe_invoice_id)
        .bind(now)
        .bind(id)
        .execute(executor)
        .await?;
    Ok(())
}

/// Attach the remote invoice id to a record that has none yet. Used when a
/// webhook arrives before the orchestrator stored the id.
pub async fn backfill_stripe_invoice(
    executor: impl SqliteExecutor<'_>,
    id: i64,
    stripe_invoice_id: &str,
    now: i64,
) -> Result<bool, sqlx::Error> {
    let rows = sqlx::query(
        "UPDATE invoice_records SET stripe_invoice_id = ?, updated_at = ?
         WHERE id = ? AND stripe_invoice_id IS NULL",
    )
    .bind(stripe_invoice_id)
    .bind(now)
    .bind(id)
    .execute(executor)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// Record the hosted payment URL and move `pending -> open`.
///
/// The URL is always overwritten; the status only advances from `pending`
/// so a record already marked paid stays paid.
pub async fn mark_open(
    executor: impl SqliteExecutor<'_>,
    id: i64,
    hosted_url: &str,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE invoice_records
         SET hosted_url = ?,
             status = CASE status WHEN 'pending' THEN 'open' ELSE status END,
             updated_at = ?
         WHERE id = ?",
    )
    .bind(hosted_url)
    .bind(now)
    .bind(id)
    .execute(executor)
    .await?;
    Ok(())
}

/// Mark the record for a remote invoice paid. Returns its estimate id, or
/// `None` when no record matches.
pub async fn mark_paid(
    conn: &mut SqliteConnection,
    stripe_invoice_id: &str,
    now: i64,
) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar(
        "UPDATE invoice_records SET status = 'paid', updated_at = ? WHERE stripe_invoice_id = ?
         RETURNING estimate_id",
    )
    .bind(now)
    .bind(stripe_invoice_id)
    .fetch_optional(conn)
    .await
}

/// Whether both deposit and balance exist for the estimate and all are paid
pub async fn fully_paid(
    conn: &mut SqliteConnection,
    estimate_id: i64,
) -> Result<bool, sqlx::Error> {
    let (kinds, unpaid): (i64, i64) = sqlx::query_as(
        "SELECT COUNT(DISTINCT kind), COALESCE(SUM(CASE WHEN status <> 'paid' THEN 1 ELSE 0 END), 0)
         FROM invoice_records WHERE estimate_id = ?",
    )
    .bind(estimate_id)
    .fetch_one(conn)
    .await?;
    Ok(kinds == 2 && unpaid == 0)
}
