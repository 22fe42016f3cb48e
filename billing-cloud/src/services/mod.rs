//! Business operations
//!
//! Handlers in `api` stay thin and call into these. Every operation returns
//! [`ServiceResult`](crate::error::ServiceResult); database and provider
//! failures are logged once when converted to an `AppError`.

pub mod customers;
pub mod estimates;
pub mod invoices;
pub mod items;
pub mod organizations;
pub mod split_payment;
pub mod webhook;

use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Estimate, Invoice, LineItemInput, PaginatedResponse};
use sqlx::SqliteConnection;

use crate::db;
use crate::error::ServiceResult;

/// Trim a free-text field; blank becomes `None`.
pub(crate) fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Trimmed non-blank value of a required text field
pub(crate) fn require_text(value: &str, field: &str) -> AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::required(field));
    }
    Ok(value.to_string())
}

/// Validate document lines, pairing each with its computed amount.
pub(crate) fn priced_lines(lines: &[LineItemInput]) -> AppResult<Vec<(LineItemInput, i64)>> {
    if lines.is_empty() {
        return Err(AppError::new(ErrorCode::DocumentEmpty));
    }
    lines
        .iter()
        .map(|line| Ok((line.clone(), line.amount_cents()?)))
        .collect()
}

pub(crate) fn page<T>(
    rows: Vec<T>,
    total: i64,
    q: &shared::models::ListQuery,
) -> PaginatedResponse<T> {
    PaginatedResponse::new(rows, total.max(0) as u64, q.page(), q.limit())
}

/// Lock the estimate row for the rest of the transaction and load it.
pub(crate) async fn lock_estimate(
    conn: &mut SqliteConnection,
    id: i64,
    now: i64,
) -> ServiceResult<Estimate> {
    if !db::estimates::touch(&mut *conn, id, now).await? {
        return Err(AppError::new(ErrorCode::EstimateNotFound).into());
    }
    Ok(db::estimates::find_by_id(conn, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::EstimateNotFound))?)
}

pub(crate) async fn lock_invoice(
    conn: &mut SqliteConnection,
    id: i64,
    now: i64,
) -> ServiceResult<Invoice> {
    if !db::invoices::touch(&mut *conn, id, now).await? {
        return Err(AppError::new(ErrorCode::InvoiceNotFound).into());
    }
    Ok(db::invoices::find_by_id(conn, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::InvoiceNotFound))?)
}

/// Check the customer exists and belongs to `org_id`.
pub(crate) async fn require_customer(
    conn: &mut SqliteConnection,
    org_id: i64,
    customer_id: i64,
) -> ServiceResult<()> {
    match db::customers::find_by_id(conn, customer_id).await? {
        Some(c) if c.org_id == org_id => Ok(()),
        _ => Err(AppError::new(ErrorCode::CustomerNotFound)
            .with_detail("customer_id", customer_id)
            .into()),
    }
}
