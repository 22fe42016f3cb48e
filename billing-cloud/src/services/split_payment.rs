//! Split-payment orchestrator
//!
//! Bills an accepted estimate in two halves (deposit, then balance) as
//! remote invoices on the organization's connected account.
//!
//! Flow per request:
//! 1. One transaction checks the preconditions and writes (or finds) a
//!    `pending` ledger record carrying a fresh idempotency key.
//! 2. Remote calls run outside the transaction, each tagged
//!    `{key}-{step}`. The remote invoice id is stored as soon as it exists.
//! 3. The record moves to `open` with the hosted URL.
//!
//! A failure in step 2 leaves the record `pending`; the next request for
//! the same half resumes it with the same key, so the provider hands back
//! the objects it already created instead of duplicating them.

use shared::error::{AppError, ErrorCode};
use shared::models::{
    Customer, Estimate, EstimateStatus, InvoiceRecord, PaymentRecordStatus, SplitKind,
    SplitPaymentResponse,
};
use shared::money::{self, APPLICATION_FEE_RATE};
use shared::util::{now_millis, snowflake_id};

use crate::db;
use crate::error::ServiceResult;
use crate::state::AppState;
use crate::stripe::{AddInvoiceItem, CreateCustomer, CreateInvoice, INVOICE_DAYS_UNTIL_DUE};

/// Everything the remote phase needs, captured under the lock
struct Prepared {
    estimate: Estimate,
    customer: Customer,
    account_id: String,
    record: InvoiceRecord,
}

/// Issue the deposit or balance invoice for an estimate.
pub async fn request(
    state: &AppState,
    estimate_id: i64,
    kind: SplitKind,
) -> ServiceResult<SplitPaymentResponse> {
    let prepared = prepare(state, estimate_id, kind).await?;
    let record_id = prepared.record.id;

    match issue_remote(state, &prepared).await {
        Ok(response) => {
            tracing::info!(
                estimate_id,
                record_id,
                kind = kind.as_str(),
                amount_cents = response.amount_cents,
                invoice_id = %response.invoice_id,
                "Split payment invoice issued"
            );
            Ok(response)
        }
        Err(e) => {
            tracing::warn!(
                estimate_id,
                record_id,
                kind = kind.as_str(),
                "Split payment left pending after provider failure"
            );
            Err(e)
        }
    }
}

/// Ledger entries of an estimate, deposit first
pub async fn ledger(state: &AppState, estimate_id: i64) -> ServiceResult<Vec<InvoiceRecord>> {
    if db::estimates::find_by_id(&state.pool, estimate_id).await?.is_none() {
        return Err(AppError::new(ErrorCode::EstimateNotFound).into());
    }
    Ok(db::invoice_records::list_by_estimate(&state.pool, estimate_id).await?)
}

/// Phase 1: validate and reserve the ledger record.
async fn prepare(state: &AppState, estimate_id: i64, kind: SplitKind) -> ServiceResult<Prepared> {
    let now = now_millis();
    let mut tx = state.pool.begin().await?;

    let estimate = super::lock_estimate(&mut tx, estimate_id, now).await?;

    let account_id = db::organizations::find_by_id(&mut *tx, estimate.org_id)
        .await?
        .and_then(|org| org.stripe_account_id)
        .ok_or_else(|| {
            AppError::new(ErrorCode::PaymentAccountNotLinked).with_detail("org_id", estimate.org_id)
        })?;

    if estimate.status != EstimateStatus::Accepted {
        return Err(AppError::new(ErrorCode::EstimateNotAccepted)
            .with_detail("status", estimate.status.as_str())
            .into());
    }

    if kind == SplitKind::Balance {
        let deposit =
            db::invoice_records::find_by_estimate_kind(&mut *tx, estimate_id, SplitKind::Deposit)
                .await?;
        if !matches!(deposit, Some(ref d) if d.status == PaymentRecordStatus::Paid) {
            return Err(AppError::new(ErrorCode::DepositNotPaid)
                .with_detail("estimate_id", estimate_id)
                .into());
        }
    }

    let record = match db::invoice_records::find_by_estimate_kind(&mut *tx, estimate_id, kind)
        .await?
    {
        Some(existing) if existing.status != PaymentRecordStatus::Pending => {
            return Err(AppError::new(ErrorCode::SplitPaymentExists)
                .with_detail("kind", kind.as_str())
                .with_detail("record_id", existing.id)
                .into());
        }
        Some(pending) => {
            tracing::info!(estimate_id, record_id = pending.id, "Resuming pending split payment");
            pending
        }
        None => {
            let amount_cents = money::split_amount(estimate.total_cents)?;
            if amount_cents == 0 {
                return Err(AppError::with_message(
                    ErrorCode::InvalidAmount,
                    "Estimate total is zero, nothing to bill",
                )
                .into());
            }
            let record = InvoiceRecord {
                id: snowflake_id(),
                estimate_id,
                kind,
                stripe_invoice_id: None,
                hosted_url: None,
                amount_cents,
                application_fee_cents: money::application_fee(amount_cents, APPLICATION_FEE_RATE)?,
                status: PaymentRecordStatus::Pending,
                idempotency_key: uuid::Uuid::new_v4().to_string(),
                created_at: now,
                updated_at: now,
            };
            db::invoice_records::insert(&mut tx, &record).await?;
            record
        }
    };

    let customer = db::customers::find_by_id(&mut *tx, estimate.customer_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::CustomerNotFound))?;

    tx.commit().await?;

    Ok(Prepared {
        estimate,
        customer,
        account_id,
        record,
    })
}

/// Phases 2 and 3: create, fill and finalize the remote invoice.
async fn issue_remote(state: &AppState, p: &Prepared) -> ServiceResult<SplitPaymentResponse> {
    let key = &p.record.idempotency_key;
    let provider = state.payments.as_ref();

    let customer_id = match &p.customer.stripe_customer_id {
        Some(id) => id.clone(),
        None => {
            let id = provider
                .create_customer(CreateCustomer {
                    account_id: &p.account_id,
                    name: &p.customer.name,
                    email: p.customer.email.as_deref(),
                    idempotency_key: &format!("{key}-customer"),
                })
                .await?;
            db::customers::set_stripe_customer(
                &state.pool,
                p.customer.id,
                &p.account_id,
                &id,
                now_millis(),
            )
            .await?;
            id
        }
    };

    let invoice_id = match &p.record.stripe_invoice_id {
        Some(id) => id.clone(),
        None => {
            let id = provider
                .create_draft_invoice(CreateInvoice {
                    account_id: &p.account_id,
                    customer_id: &customer_id,
                    days_until_due: INVOICE_DAYS_UNTIL_DUE,
                    record_id: p.record.id,
                    estimate_id: p.estimate.id,
                    idempotency_key: &format!("{key}-invoice"),
                })
                .await?;
            db::invoice_records::set_stripe_invoice(&state.pool, p.record.id, &id, now_millis())
                .await?;
            id
        }
    };

    provider
        .add_invoice_item(AddInvoiceItem {
            account_id: &p.account_id,
            customer_id: &customer_id,
            invoice_id: &invoice_id,
            amount_cents: p.record.amount_cents,
            currency: &state.currency,
            description: &format!("{} - {}", p.record.kind.label(), p.estimate.number),
            idempotency_key: &format!("{key}-item"),
        })
        .await?;

    let finalized = provider
        .finalize_invoice(&p.account_id, &invoice_id, &format!("{key}-finalize"))
        .await?;

    db::invoice_records::mark_open(&state.pool, p.record.id, &finalized.hosted_url, now_millis())
        .await?;

    Ok(SplitPaymentResponse {
        record_id: p.record.id,
        hosted_url: finalized.hosted_url,
        invoice_id: finalized.id,
        amount_cents: p.record.amount_cents,
    })
}
