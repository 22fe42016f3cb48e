//! Estimate lifecycle: create, edit, send, accept, cancel, delete

use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::models::{
    Acceptance, ContractSnapshot, Estimate, EstimateAccept, EstimateCreate, EstimateDetail,
    EstimateSent, EstimateStatus, EstimateUpdate, ListQuery, PaginatedResponse, Signature, pricing,
};
use shared::money;
use shared::numbering::{DocumentKind, format_number};
use shared::util::{now_millis, parse_date, snowflake_id};
use sqlx::SqlitePool;

use super::{lock_estimate, normalize, page, priced_lines, require_customer, require_text};
use crate::db;
use crate::error::ServiceResult;
use crate::state::AppState;

/// Recorded when the request carries no client address
const UNKNOWN_IP: &str = "unknown";

fn not_found() -> AppError {
    AppError::new(ErrorCode::EstimateNotFound)
}

pub async fn create(pool: &SqlitePool, req: EstimateCreate) -> ServiceResult<EstimateDetail> {
    let issue_date = parse_date(&req.issue_date, "issue_date")?.to_string();
    let valid_until = match normalize(req.valid_until) {
        Some(d) => Some(parse_date(&d, "valid_until")?.to_string()),
        None => None,
    };
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
    let seq = db::counters::next_value(&mut tx, req.org_id, DocumentKind::Estimate).await?;
    let estimate = Estimate {
        id: snowflake_id(),
        org_id: req.org_id,
        customer_id: req.customer_id,
        number: format_number(DocumentKind::Estimate, seq),
        issue_date,
        valid_until,
        subtotal_cents: totals.subtotal_cents,
        tax_cents: totals.tax_cents,
        discount_cents: totals.discount_cents,
        total_cents: totals.total_cents,
        status: EstimateStatus::Draft,
        signature_id: None,
        contract_id: None,
        notes: normalize(req.notes),
        created_at: now,
        updated_at: now,
    };
    db::estimates::insert(&mut tx, &estimate).await?;
    db::line_items::insert_all(&mut tx, DocumentKind::Estimate, estimate.id, &lines).await?;
    tx.commit().await?;

    tracing::info!(
        estimate_id = estimate.id,
        number = %estimate.number,
        total_cents = estimate.total_cents,
        "Estimate created"
    );
    get(pool, estimate.id).await
}

/// Estimate with its line items, payment ledger and acceptance record
pub async fn get(pool: &SqlitePool, id: i64) -> ServiceResult<EstimateDetail> {
    let estimate = db::estimates::find_by_id(pool, id)
        .await?
        .ok_or_else(not_found)?;
    let line_items = db::line_items::list(pool, DocumentKind::Estimate, id).await?;
    let payments = db::invoice_records::list_by_estimate(pool, id).await?;
    let signature = match estimate.signature_id {
        Some(sid) => db::signatures::find_signature(pool, sid).await?,
        None => None,
    };
    let contract = match estimate.contract_id {
        Some(cid) => db::signatures::find_contract(pool, cid).await?,
        None => None,
    };
    Ok(EstimateDetail {
        estimate,
        line_items,
        payments,
        signature,
        contract,
    })
}

pub async fn list(pool: &SqlitePool, q: &ListQuery) -> ServiceResult<PaginatedResponse<Estimate>> {
    let (rows, total) = db::estimates::list(pool, q).await?;
    Ok(page(rows, total, q))
}

/// Apply a partial edit.
///
/// Supplied line items replace the stored set. Totals are taken from the
/// request as given and must add up; they are not derived from the lines.
pub async fn update(
    pool: &SqlitePool,
    id: i64,
    req: EstimateUpdate,
) -> ServiceResult<EstimateDetail> {
    let lines = match &req.line_items {
        Some(lines) => Some(priced_lines(lines)?),
        None => None,
    };

    let now = now_millis();
    let mut tx = pool.begin().await?;
    let mut estimate = lock_estimate(&mut tx, id, now).await?;

    if let Some(customer_id) = req.customer_id {
        require_customer(&mut tx, estimate.org_id, customer_id).await?;
        estimate.customer_id = customer_id;
    }
    if let Some(issue_date) = req.issue_date {
        estimate.issue_date = parse_date(&issue_date, "issue_date")?.to_string();
    }
    if req.valid_until.is_some() {
        estimate.valid_until = match normalize(req.valid_until) {
            Some(d) => Some(parse_date(&d, "valid_until")?.to_string()),
            None => None,
        };
    }
    if let Some(v) = req.subtotal_cents {
        estimate.subtotal_cents = v;
    }
    if let Some(v) = req.tax_cents {
        estimate.tax_cents = v;
    }
    if let Some(v) = req.discount_cents {
        estimate.discount_cents = v;
    }
    if let Some(v) = req.total_cents {
        estimate.total_cents = v;
    }
    if req.notes.is_some() {
        estimate.notes = normalize(req.notes);
    }
    if let Some(status) = req.status
        && status != estimate.status
    {
        // Acceptance needs a signature, completion comes from payments
        if matches!(status, EstimateStatus::Accepted | EstimateStatus::Completed) {
            return Err(AppError::with_message(
                ErrorCode::EstimateInvalidTransition,
                format!("Estimate status {} cannot be set directly", status.as_str()),
            )
            .with_detail("from", estimate.status.as_str())
            .with_detail("to", status.as_str())
            .into());
        }
        estimate.status = estimate.status.transition(status)?;
    }
    estimate.totals().verify()?;
    estimate.updated_at = now;

    db::estimates::update_header(&mut tx, &estimate).await?;
    if let Some(lines) = &lines {
        db::line_items::replace_all(&mut tx, DocumentKind::Estimate, id, lines).await?;
    }
    tx.commit().await?;

    tracing::info!(estimate_id = id, "Estimate updated");
    get(pool, id).await
}

/// Move to `sent` and return the customer-facing link.
pub async fn send(state: &AppState, id: i64) -> ServiceResult<EstimateSent> {
    let estimate = change_status(&state.pool, id, EstimateStatus::Sent).await?;
    tracing::info!(estimate_id = id, "Estimate sent");
    Ok(EstimateSent {
        public_url: state.estimate_url(id),
        estimate,
    })
}

pub async fn cancel(pool: &SqlitePool, id: i64) -> ServiceResult<Estimate> {
    let estimate = change_status(pool, id, EstimateStatus::Cancelled).await?;
    tracing::info!(estimate_id = id, "Estimate cancelled");
    Ok(estimate)
}

async fn change_status(
    pool: &SqlitePool,
    id: i64,
    next: EstimateStatus,
) -> ServiceResult<Estimate> {
    let now = now_millis();
    let mut tx = pool.begin().await?;
    let mut estimate = lock_estimate(&mut tx, id, now).await?;
    estimate.status = estimate.status.transition(next)?;
    estimate.updated_at = now;
    db::estimates::set_status(&mut tx, id, estimate.status, now).await?;
    tx.commit().await?;
    Ok(estimate)
}

/// Sign an estimate.
///
/// Writes the signature, a frozen copy of the contract text and the status
/// change in one transaction. A second acceptance is a conflict.
pub async fn accept(
    pool: &SqlitePool,
    id: i64,
    req: EstimateAccept,
    ip_address: Option<&str>,
) -> ServiceResult<Acceptance> {
    let signer_name = require_text(&req.signer_name, "signer_name")?;
    let ip_address = ip_address
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .unwrap_or(UNKNOWN_IP)
        .to_string();

    let now = now_millis();
    let mut tx = pool.begin().await?;
    let mut estimate = lock_estimate(&mut tx, id, now).await?;

    if estimate.signature_id.is_some()
        || matches!(
            estimate.status,
            EstimateStatus::Accepted | EstimateStatus::Completed
        )
    {
        return Err(AppError::new(ErrorCode::EstimateAlreadyAccepted)
            .with_detail("estimate_id", id)
            .into());
    }
    estimate.status = estimate.status.transition(EstimateStatus::Accepted)?;

    let content = match normalize(req.contract_content) {
        Some(content) => content,
        None => db::contract_templates::find_active(&mut *tx, estimate.org_id)
            .await?
            .map(|t| t.content)
            .unwrap_or_default(),
    };

    let signature = Signature {
        id: snowflake_id(),
        estimate_id: id,
        signer_name,
        ip_address,
        signed_at: now,
    };
    let contract = ContractSnapshot {
        id: snowflake_id(),
        estimate_id: id,
        content,
        created_at: now,
    };
    db::signatures::insert_signature(&mut tx, &signature).await?;
    db::signatures::insert_contract(&mut tx, &contract).await?;
    db::estimates::set_accepted(&mut tx, id, signature.id, contract.id, now).await?;
    tx.commit().await?;

    estimate.signature_id = Some(signature.id);
    estimate.contract_id = Some(contract.id);
    estimate.updated_at = now;

    tracing::info!(estimate_id = id, signature_id = signature.id, "Estimate accepted");
    Ok(Acceptance {
        estimate,
        signature,
        contract,
    })
}

/// Delete an estimate and its line items. Ledger, signature and contract
/// rows are kept.
pub async fn delete(pool: &SqlitePool, id: i64) -> ServiceResult<()> {
    if !db::estimates::delete(pool, id).await? {
        return Err(not_found().into());
    }
    tracing::info!(estimate_id = id, "Estimate deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{self, line, test_pool};
    use shared::models::LineItemInput;

    fn new_estimate(org_id: i64, customer_id: i64, lines: Vec<LineItemInput>) -> EstimateCreate {
        EstimateCreate {
            org_id,
            customer_id,
            issue_date: "2026-03-01".into(),
            valid_until: Some("2026-03-31".into()),
            tax_rate: Some(Decimal::new(10, 2)),
            discount_cents: Some(500),
            notes: None,
            line_items: lines,
        }
    }

    #[tokio::test]
    async fn test_create_numbers_and_totals() {
        let pool = test_pool().await;
        let org = test_support::seed_org(&pool, None).await;
        let customer = test_support::seed_customer(&pool, org.id).await;

        let first = create(
            &pool,
            new_estimate(
                org.id,
                customer.id,
                vec![line("Labor", 2, 2500), line("Paint", 3, 1000)],
            ),
        )
        .await
        .unwrap();
        assert_eq!(first.estimate.number, "EST-001");
        assert_eq!(first.estimate.status, EstimateStatus::Draft);
        assert_eq!(first.estimate.subtotal_cents, 8000);
        assert_eq!(first.estimate.tax_cents, 800);
        assert_eq!(first.estimate.total_cents, 8300);
        assert_eq!(first.line_items.len(), 2);
        assert_eq!(first.line_items[0].amount_cents, 5000);
        assert_eq!(first.line_items[1].position, 1);

        let second = create(
            &pool,
            new_estimate(org.id, customer.id, vec![line("Labor", 1, 100)]),
        )
        .await
        .unwrap();
        assert_eq!(second.estimate.number, "EST-002");
    }

    #[tokio::test]
    async fn test_numbers_not_reused_after_delete() {
        let pool = test_pool().await;
        let org = test_support::seed_org(&pool, None).await;
        let customer = test_support::seed_customer(&pool, org.id).await;

        let first = create(
            &pool,
            new_estimate(org.id, customer.id, vec![line("Labor", 1, 10_000)]),
        )
        .await
        .unwrap();
        delete(&pool, first.estimate.id).await.unwrap();

        let next = create(
            &pool,
            new_estimate(org.id, customer.id, vec![line("Labor", 1, 10_000)]),
        )
        .await
        .unwrap();
        assert_eq!(next.estimate.number, "EST-002");
    }

    #[tokio::test]
    async fn test_create_rejects_bad_input() {
        let pool = test_pool().await;
        let org = test_support::seed_org(&pool, None).await;
        let customer = test_support::seed_customer(&pool, org.id).await;

        let err = create(&pool, new_estimate(org.id, customer.id, vec![]))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::DocumentEmpty);

        let err = create(
            &pool,
            new_estimate(org.id, customer.id, vec![line("Labor", 0, 100)]),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationFailed);

        let mut req = new_estimate(org.id, customer.id, vec![line("Labor", 1, 100)]);
        req.discount_cents = Some(10_000);
        let err = create(&pool, req).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationFailed);

        let other_org = test_support::seed_org(&pool, None).await;
        let err = create(
            &pool,
            new_estimate(other_org.id, customer.id, vec![line("Labor", 1, 100)]),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code(), ErrorCode::CustomerNotFound);

        // nothing half-created
        let q = ListQuery {
            org_id: org.id,
            ..Default::default()
        };
        assert_eq!(list(&pool, &q).await.unwrap().total, 0);
    }

    #[tokio::test]
    async fn test_update_replaces_line_items() {
        let pool = test_pool().await;
        let org = test_support::seed_org(&pool, None).await;
        let customer = test_support::seed_customer(&pool, org.id).await;
        let created = create(
            &pool,
            EstimateCreate {
                tax_rate: None,
                discount_cents: None,
                ..new_estimate(
                    org.id,
                    customer.id,
                    vec![line("Labor", 2, 2500), line("Paint", 3, 1000)],
                )
            },
        )
        .await
        .unwrap();
        let old_ids: Vec<i64> = created.line_items.iter().map(|l| l.id).collect();

        let updated = update(
            &pool,
            created.estimate.id,
            EstimateUpdate {
                line_items: Some(vec![line("Full job", 1, 8000)]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.line_items.len(), 1);
        assert_eq!(updated.line_items[0].description, "Full job");
        assert!(old_ids.iter().all(|id| updated.line_items[0].id != *id));
        // header untouched: totals are the caller's responsibility
        assert_eq!(updated.estimate.total_cents, 8000);
    }

    #[tokio::test]
    async fn test_update_rejects_inconsistent_totals() {
        let pool = test_pool().await;
        let org = test_support::seed_org(&pool, None).await;
        let customer = test_support::seed_customer(&pool, org.id).await;
        let estimate = test_support::seed_estimate(&pool, org.id, customer.id, 10_000).await;

        let err = update(
            &pool,
            estimate.id,
            EstimateUpdate {
                total_cents: Some(9_000),
                line_items: Some(vec![line("Labor", 1, 9_000)]),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code(), ErrorCode::TotalsMismatch);

        // rolled back, including the line items
        let detail = get(&pool, estimate.id).await.unwrap();
        assert_eq!(detail.estimate.total_cents, 10_000);
        assert_eq!(detail.line_items[0].unit_cents, 10_000);

        let updated = update(
            &pool,
            estimate.id,
            EstimateUpdate {
                subtotal_cents: Some(9_000),
                total_cents: Some(9_000),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.estimate.total_cents, 9_000);
    }

    #[tokio::test]
    async fn test_update_status_goes_through_transitions() {
        let pool = test_pool().await;
        let org = test_support::seed_org(&pool, None).await;
        let customer = test_support::seed_customer(&pool, org.id).await;
        let estimate = test_support::seed_estimate(&pool, org.id, customer.id, 10_000).await;

        let err = update(
            &pool,
            estimate.id,
            EstimateUpdate {
                status: Some(EstimateStatus::Accepted),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code(), ErrorCode::EstimateInvalidTransition);

        let detail = update(
            &pool,
            estimate.id,
            EstimateUpdate {
                status: Some(EstimateStatus::Cancelled),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(detail.estimate.status, EstimateStatus::Cancelled);

        let err = cancel(&pool, estimate.id).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::EstimateInvalidTransition);
    }

    #[tokio::test]
    async fn test_send_returns_public_url() {
        let state = test_support::test_state().await;
        let org = test_support::seed_org(&state.pool, None).await;
        let customer = test_support::seed_customer(&state.pool, org.id).await;
        let estimate = test_support::seed_estimate(&state.pool, org.id, customer.id, 10_000).await;

        let sent = send(&state, estimate.id).await.unwrap();
        assert_eq!(sent.estimate.status, EstimateStatus::Sent);
        assert_eq!(
            sent.public_url,
            format!("https://billing.test/estimate/{}", estimate.id)
        );
        // re-sending is allowed
        send(&state, estimate.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_accept_snapshots_contract() {
        let pool = test_pool().await;
        let org = test_support::seed_org(&pool, None).await;
        let customer = test_support::seed_customer(&pool, org.id).await;
        let estimate = test_support::seed_estimate(&pool, org.id, customer.id, 10_000).await;
        crate::services::organizations::set_contract_template(
            &pool,
            org.id,
            shared::models::ContractTemplateCreate {
                name: "Standard".into(),
                content: "Work starts after deposit.".into(),
            },
        )
        .await
        .unwrap();

        let acceptance = accept(
            &pool,
            estimate.id,
            EstimateAccept {
                signer_name: "Ana Souza".into(),
                contract_content: None,
            },
            Some("203.0.113.7"),
        )
        .await
        .unwrap();
        assert_eq!(acceptance.estimate.status, EstimateStatus::Accepted);
        assert_eq!(acceptance.signature.ip_address, "203.0.113.7");
        assert_eq!(acceptance.contract.content, "Work starts after deposit.");

        let stored = get(&pool, estimate.id).await.unwrap();
        assert_eq!(stored.estimate.signature_id, Some(acceptance.signature.id));
        assert_eq!(stored.estimate.contract_id, Some(acceptance.contract.id));
        assert_eq!(
            stored.signature.map(|s| s.signer_name).as_deref(),
            Some("Ana Souza")
        );
        let contract = stored.contract.unwrap();
        assert_eq!(contract.content, "Work starts after deposit.");
    }

    #[tokio::test]
    async fn test_accept_twice_conflicts() {
        let pool = test_pool().await;
        let org = test_support::seed_org(&pool, None).await;
        let customer = test_support::seed_customer(&pool, org.id).await;
        let estimate = test_support::seed_estimate(&pool, org.id, customer.id, 10_000).await;

        let req = EstimateAccept {
            signer_name: "Ana".into(),
            contract_content: Some("Custom terms".into()),
        };
        let first = accept(&pool, estimate.id, req.clone(), None).await.unwrap();
        assert_eq!(first.signature.ip_address, "unknown");
        assert_eq!(first.contract.content, "Custom terms");

        let err = accept(&pool, estimate.id, req, None).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::EstimateAlreadyAccepted);

        // first signature still referenced
        let stored = get(&pool, estimate.id).await.unwrap().estimate;
        assert_eq!(stored.signature_id, Some(first.signature.id));
    }

    #[tokio::test]
    async fn test_accept_requires_signer_and_open_estimate() {
        let pool = test_pool().await;
        let org = test_support::seed_org(&pool, None).await;
        let customer = test_support::seed_customer(&pool, org.id).await;
        let estimate = test_support::seed_estimate(&pool, org.id, customer.id, 10_000).await;

        let err = accept(
            &pool,
            estimate.id,
            EstimateAccept {
                signer_name: " ".into(),
                contract_content: None,
            },
            None,
        )
        .await
        .unwrap_err();
        assert_eq!(err.code(), ErrorCode::RequiredField);

        cancel(&pool, estimate.id).await.unwrap();
        let err = accept(
            &pool,
            estimate.id,
            EstimateAccept {
                signer_name: "Ana".into(),
                contract_content: None,
            },
            None,
        )
        .await
        .unwrap_err();
        assert_eq!(err.code(), ErrorCode::EstimateInvalidTransition);
    }

    #[tokio::test]
    async fn test_delete_cascades_lines() {
        let pool = test_pool().await;
        let org = test_support::seed_org(&pool, None).await;
        let customer = test_support::seed_customer(&pool, org.id).await;
        let estimate = test_support::seed_estimate(&pool, org.id, customer.id, 10_000).await;

        delete(&pool, estimate.id).await.unwrap();
        let lines = db::line_items::list(&pool, DocumentKind::Estimate, estimate.id)
            .await
            .unwrap();
        assert!(lines.is_empty());
        let err = get(&pool, estimate.id).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::EstimateNotFound);
    }
}
