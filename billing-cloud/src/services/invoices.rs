//! Invoice lifecycle
//!
//! Invoices are standalone documents with their own `INV-NNN` series; they
//! are not derived from estimates.

use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::models::{
    Invoice, InvoiceCreate, InvoiceDetail, InvoiceStatus, InvoiceUpdate, ListQuery,
    PaginatedResponse, pricing,
};
use shared::money;
use shared::numbering::{DocumentKind, format_number};
use shared::util::{now_millis, parse_date, snowflake_id};
use sqlx::SqlitePool;

use super::{lock_invoice, normalize, page, priced_lines, require_customer};
use crate::db;
use crate::error::ServiceResult;

fn not_found() -> AppError {
    AppError::new(ErrorCode::InvoiceNotFound)
}

fn optional_date(value: Option<String>, field: &str) -> Result<Option<String>, AppError> {
    match normalize(value) {
        Some(d) => Ok(Some(parse_date(&d, field)?.to_string())),
        None => Ok(None),
    }
}

pub async fn create(pool: &SqlitePool, req: InvoiceCreate) -> ServiceResult<InvoiceDetail> {
    let issue_date = parse_date(&req.issue_date, "issue_date")?.to_string();
    let due_date = optional_date(req.due_date, "due_date")?;
    let lines = priced_lines(&req.line_items)?;
    let totals = money::compute_totals(
        pricing(&req.line_items),
        req.tax_rate.unwrap_or(Decimal::ZERO),
        req.discount_cents.unwrap_or(0),
    )?;

    let mut conn = pool.acquire().await?;
    if db::organizations::find_by_id(&mut *conn, req.org_id).await?.is_none() {
        return Err(AppError::new(ErrorCode::OrganizationNotFound).into());
    }
    require_customer(&mut conn, req.org_id, req.customer_id).await?;
    drop(conn);

    let now = now_millis();
    let mut tx = pool.begin().await?;
    let seq = db::counters::next_value(&mut tx, req.org_id, DocumentKind::Invoice).await?;
    let invoice = Invoice {
        id: snowflake_id(),
        org_id: req.org_id,
        customer_id: req.customer_id,
        number: format_number(DocumentKind::Invoice, seq),
        issue_date,
        due_date,
        subtotal_cents: totals.subtotal_cents,
        tax_cents: totals.tax_cents,
        discount_cents: totals.discount_cents,
        total_cents: totals.total_cents,
        status: InvoiceStatus::Draft,
        notes: normalize(req.notes),
        created_at: now,
        updated_at: now,
    };
    db::invoices::insert(&mut tx, &invoice).await?;
    db::line_items::insert_all(&mut tx, DocumentKind::Invoice, invoice.id, &lines).await?;
    tx.commit().await?;

    tracing::info!(invoice_id = invoice.id, number = %invoice.number, "Invoice created");
    get(pool, invoice.id).await
}

pub async fn get(pool: &SqlitePool, id: i64) -> ServiceResult<InvoiceDetail> {
    let invoice = db::invoices::find_by_id(pool, id)
        .await?
        .ok_or_else(not_found)?;
    let line_items = db::line_items::list(pool, DocumentKind::Invoice, id).await?;
    Ok(InvoiceDetail {
        invoice,
        line_items,
    })
}

pub async fn list(pool: &SqlitePool, q: &ListQuery) -> ServiceResult<PaginatedResponse<Invoice>> {
    let (rows, total) = db::invoices::list(pool, q).await?;
    Ok(page(rows, total, q))
}

/// Partial edit with the same replace-on-write line semantics as estimates.
pub async fn update(pool: &SqlitePool, id: i64, req: InvoiceUpdate) -> ServiceResult<InvoiceDetail> {
    let lines = match &req.line_items {
        Some(lines) => Some(priced_lines(lines)?),
        None => None,
    };

    let now = now_millis();
    let mut tx = pool.begin().await?;
    let mut invoice = lock_invoice(&mut tx, id, now).await?;

    if let Some(customer_id) = req.customer_id {
        require_customer(&mut tx, invoice.org_id, customer_id).await?;
        invoice.customer_id = customer_id;
    }
    if let Some(issue_date) = req.issue_date {
        invoice.issue_date = parse_date(&issue_date, "issue_date")?.to_string();
    }
    if req.due_date.is_some() {
        invoice.due_date = optional_date(req.due_date, "due_date")?;
    }
    if let Some(v) = req.subtotal_cents {
        invoice.subtotal_cents = v;
    }
    if let Some(v) = req.tax_cents {
        invoice.tax_cents = v;
    }
    if let Some(v) = req.discount_cents {
        invoice.discount_cents = v;
    }
    if let Some(v) = req.total_cents {
        invoice.total_cents = v;
    }
    if req.notes.is_some() {
        invoice.notes = normalize(req.notes);
    }
    if let Some(status) = req.status
        && status != invoice.status
    {
        invoice.status = invoice.status.transition(status)?;
    }
    invoice.totals().verify()?;
    invoice.updated_at = now;

    db::invoices::update_header(&mut tx, &invoice).await?;
    if let Some(lines) = &lines {
        db::line_items::replace_all(&mut tx, DocumentKind::Invoice, id, lines).await?;
    }
    tx.commit().await?;

    tracing::info!(invoice_id = id, "Invoice updated");
    get(pool, id).await
}

/// Apply one lifecycle step (`send`, `paid`, `overdue`, `cancel`).
pub async fn change_status(
    pool: &SqlitePool,
    id: i64,
    next: InvoiceStatus,
) -> ServiceResult<Invoice> {
    let now = now_millis();
    let mut tx = pool.begin().await?;
    let mut invoice = lock_invoice(&mut tx, id, now).await?;
    invoice.status = invoice.status.transition(next)?;
    invoice.updated_at = now;
    db::invoices::set_status(&mut tx, id, invoice.status, now).await?;
    tx.commit().await?;

    tracing::info!(invoice_id = id, status = next.as_str(), "Invoice status changed");
    Ok(invoice)
}

/// Delete an unpaid invoice and its line items.
pub async fn delete(pool: &SqlitePool, id: i64) -> ServiceResult<()> {
    let now = now_millis();
    let mut tx = pool.begin().await?;
    let invoice = lock_invoice(&mut tx, id, now).await?;
    if invoice.status == InvoiceStatus::Paid {
        return Err(AppError::new(ErrorCode::InvoiceAlreadyPaid)
            .with_detail("invoice_id", id)
            .into());
    }
    db::invoices::delete_unpaid(&mut tx, id).await?;
    tx.commit().await?;

    tracing::info!(invoice_id = id, "Invoice deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{self, line, test_pool};

    async fn seed_invoice(pool: &SqlitePool) -> InvoiceDetail {
        let org = test_support::seed_org(pool, None).await;
        let customer = test_support::seed_customer(pool, org.id).await;
        create(
            pool,
            InvoiceCreate {
                org_id: org.id,
                customer_id: customer.id,
                issue_date: "2026-03-01".into(),
                due_date: Some("2026-03-15".into()),
                tax_rate: None,
                discount_cents: None,
                notes: None,
                line_items: vec![line("Labor", 2, 2500), line("Paint", 1, 1000)],
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_starts_series() {
        let pool = test_pool().await;
        let detail = seed_invoice(&pool).await;
        assert_eq!(detail.invoice.number, "INV-001");
        assert_eq!(detail.invoice.status, InvoiceStatus::Draft);
        assert_eq!(detail.invoice.total_cents, 6000);
        assert_eq!(detail.line_items.len(), 2);
    }

    #[tokio::test]
    async fn test_lifecycle() {
        let pool = test_pool().await;
        let id = seed_invoice(&pool).await.invoice.id;

        let err = change_status(&pool, id, InvoiceStatus::Overdue)
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvoiceInvalidTransition);

        change_status(&pool, id, InvoiceStatus::Sent).await.unwrap();
        change_status(&pool, id, InvoiceStatus::Overdue).await.unwrap();
        let paid = change_status(&pool, id, InvoiceStatus::Paid).await.unwrap();
        assert_eq!(paid.status, InvoiceStatus::Paid);

        let err = change_status(&pool, id, InvoiceStatus::Cancelled)
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvoiceInvalidTransition);
    }

    #[tokio::test]
    async fn test_delete_paid_invoice_conflicts() {
        let pool = test_pool().await;
        let id = seed_invoice(&pool).await.invoice.id;
        change_status(&pool, id, InvoiceStatus::Sent).await.unwrap();
        change_status(&pool, id, InvoiceStatus::Paid).await.unwrap();

        let err = delete(&pool, id).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvoiceAlreadyPaid);
        assert_eq!(
            err.code().class(),
            Some(shared::error::ErrorClass::Conflict)
        );
        assert!(get(&pool, id).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_draft_cascades_lines() {
        let pool = test_pool().await;
        let id = seed_invoice(&pool).await.invoice.id;

        delete(&pool, id).await.unwrap();
        let lines = db::line_items::list(&pool, DocumentKind::Invoice, id)
            .await
            .unwrap();
        assert!(lines.is_empty());
        let err = get(&pool, id).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvoiceNotFound);
    }

    #[tokio::test]
    async fn test_update_replaces_lines_and_guards_customer_delete() {
        let pool = test_pool().await;
        let detail = seed_invoice(&pool).await;
        let id = detail.invoice.id;

        let updated = update(
            &pool,
            id,
            InvoiceUpdate {
                line_items: Some(vec![line("Flat fee", 1, 6000)]),
                due_date: Some("2026-04-01".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.line_items.len(), 1);
        assert_eq!(updated.invoice.due_date.as_deref(), Some("2026-04-01"));

        let err = crate::services::customers::delete(&pool, detail.invoice.customer_id)
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::CustomerHasInvoices);
    }
}
