//! Stripe webhook reconciliation
//!
//! Every event is verified, then recorded by id before dispatch. The row is
//! stamped `processed_at` only after its handler succeeds, so a redelivery
//! of a failed event runs the handler again while a redelivery of a
//! processed one is a no-op. Handlers are safe to run twice.

use serde_json::Value;
use shared::error::{AppError, ErrorCode};
use shared::models::WebhookEvent;
use shared::util::now_millis;
use sqlx::SqlitePool;

use crate::db;
use crate::error::ServiceResult;
use crate::state::AppState;
use crate::stripe::{self, SignatureError};

/// Event types this service reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookEventType {
    InvoiceFinalized,
    InvoicePaid,
    PaymentIntentSucceeded,
    PaymentIntentFailed,
    Other,
}

impl WebhookEventType {
    pub fn parse(event_type: &str) -> Self {
        match event_type {
            "invoice.finalized" => Self::InvoiceFinalized,
            "invoice.paid" => Self::InvoicePaid,
            "payment_intent.succeeded" => Self::PaymentIntentSucceeded,
            "payment_intent.payment_failed" => Self::PaymentIntentFailed,
            _ => Self::Other,
        }
    }
}

/// Result of a delivery the caller should acknowledge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookOutcome {
    Processed,
    /// Already processed earlier; nothing was applied
    Duplicate,
}

impl From<SignatureError> for AppError {
    fn from(e: SignatureError) -> Self {
        let code = match e {
            SignatureError::MalformedHeader | SignatureError::Mismatch => {
                ErrorCode::WebhookSignatureInvalid
            }
            SignatureError::Expired => ErrorCode::WebhookTimestampExpired,
        };
        AppError::with_message(code, e.to_string())
    }
}

/// Verify, record and dispatch one webhook delivery.
pub async fn handle(
    state: &AppState,
    payload: &[u8],
    signature: Option<&str>,
) -> ServiceResult<WebhookOutcome> {
    let Some(signature) = signature else {
        tracing::warn!("Missing Stripe-Signature header");
        return Err(AppError::new(ErrorCode::WebhookSignatureMissing).into());
    };
    if let Err(e) = stripe::verify_webhook_signature(payload, signature, &state.stripe_webhook_secret)
    {
        tracing::warn!(error = %e, "Webhook signature verification failed");
        return Err(AppError::from(e).into());
    }

    let event: Value = serde_json::from_slice(payload).map_err(|e| {
        tracing::warn!(%e, "Failed to parse webhook JSON");
        AppError::with_message(ErrorCode::InvalidFormat, "Webhook body is not valid JSON")
    })?;
    let event_id = event["id"]
        .as_str()
        .ok_or_else(|| AppError::invalid_request("Webhook event missing id"))?;
    let event_type = event["type"].as_str().unwrap_or_default();

    let pool = &state.pool;
    let record = WebhookEvent {
        event_id: event_id.to_string(),
        event_type: event_type.to_string(),
        payload: String::from_utf8_lossy(payload).into_owned(),
        received_at: now_millis(),
        processed_at: None,
    };
    if !db::webhook_events::insert_if_absent(pool, &record).await? {
        let seen = db::webhook_events::find(pool, event_id).await?;
        if seen.is_some_and(|e| e.processed_at.is_some()) {
            tracing::info!(event_id, "Duplicate webhook event, skipping");
            return Ok(WebhookOutcome::Duplicate);
        }
        tracing::info!(event_id, event_type, "Retrying unprocessed webhook event");
    }

    tracing::info!(event_id, event_type, "Received Stripe webhook");
    let object = &event["data"]["object"];
    let result = match WebhookEventType::parse(event_type) {
        WebhookEventType::InvoiceFinalized => on_invoice_finalized(pool, object).await,
        WebhookEventType::InvoicePaid => on_invoice_paid(pool, object).await,
        WebhookEventType::PaymentIntentSucceeded | WebhookEventType::PaymentIntentFailed => {
            tracing::info!(event_id, event_type, "Payment intent event recorded");
            Ok(())
        }
        WebhookEventType::Other => {
            tracing::warn!(event_id, event_type, "Unhandled webhook event type");
            Ok(())
        }
    };
    if let Err(e) = result {
        tracing::error!(event_id, event_type, "Webhook handler failed, left unprocessed");
        return Err(e);
    }

    db::webhook_events::mark_processed(pool, event_id, now_millis()).await?;
    Ok(WebhookOutcome::Processed)
}

/// Remote invoice id and our ledger record id from an invoice object
fn invoice_refs(object: &Value) -> Result<(&str, Option<i64>), AppError> {
    let invoice_id = object["id"]
        .as_str()
        .ok_or_else(|| AppError::invalid_request("Invoice event missing object id"))?;
    let record_id = object["metadata"]["invoice_record_id"]
        .as_str()
        .and_then(|s| s.parse().ok());
    Ok((invoice_id, record_id))
}

/// Store the hosted URL on the matching record (unconditional overwrite).
async fn on_invoice_finalized(pool: &SqlitePool, object: &Value) -> ServiceResult<()> {
    let (invoice_id, record_id) = invoice_refs(object)?;
    let now = now_millis();

    if let Some(record_id) = record_id {
        db::invoice_records::backfill_stripe_invoice(pool, record_id, invoice_id, now).await?;
    }
    let Some(record) = db::invoice_records::find_by_stripe_invoice(pool, invoice_id).await? else {
        tracing::warn!(invoice_id, "Finalized invoice matches no ledger record");
        return Ok(());
    };
    if let Some(url) = object["hosted_invoice_url"].as_str() {
        db::invoice_records::mark_open(pool, record.id, url, now).await?;
        tracing::info!(record_id = record.id, invoice_id, "Hosted URL recorded");
    }
    Ok(())
}

/// Mark the matching record paid and complete the estimate once every
/// half is paid.
async fn on_invoice_paid(pool: &SqlitePool, object: &Value) -> ServiceResult<()> {
    let (invoice_id, record_id) = invoice_refs(object)?;
    let now = now_millis();

    let mut tx = pool.begin().await?;
    if let Some(record_id) = record_id {
        db::invoice_records::backfill_stripe_invoice(&mut *tx, record_id, invoice_id, now).await?;
    }
    let Some(estimate_id) = db::invoice_records::mark_paid(&mut tx, invoice_id, now).await? else {
        tracing::warn!(invoice_id, "Paid invoice matches no ledger record");
        return Ok(());
    };
    tracing::info!(estimate_id, invoice_id, "Ledger record paid");

    if db::invoice_records::fully_paid(&mut tx, estimate_id).await?
        && db::estimates::complete_if_accepted(&mut tx, estimate_id, now).await?
    {
        tracing::info!(estimate_id, "Estimate completed");
    }
    tx.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{self, TEST_WEBHOOK_SECRET, sign_now};
    use shared::models::{EstimateStatus, PaymentRecordStatus, SplitKind};

    fn event(id: &str, event_type: &str, object: Value) -> String {
        serde_json::json!({"id": id, "type": event_type, "data": {"object": object}}).to_string()
    }

    async fn deliver(state: &AppState, payload: &str) -> ServiceResult<WebhookOutcome> {
        let header = sign_now(payload.as_bytes(), TEST_WEBHOOK_SECRET);
        handle(state, payload.as_bytes(), Some(&header)).await
    }

    /// Accepted estimate with an open deposit record for remote invoice `in_dep`
    async fn seed_open_deposit(state: &AppState) -> (i64, i64) {
        let org = test_support::seed_org(&state.pool, Some("acct_1")).await;
        let customer = test_support::seed_customer(&state.pool, org.id).await;
        let estimate =
            test_support::seed_accepted_estimate(&state.pool, org.id, customer.id, 10_000).await;
        let record = test_support::seed_record(
            &state.pool,
            estimate.id,
            SplitKind::Deposit,
            Some("in_dep"),
            PaymentRecordStatus::Open,
        )
        .await;
        (estimate.id, record.id)
    }

    #[test]
    fn test_event_type_parse() {
        assert_eq!(
            WebhookEventType::parse("invoice.paid"),
            WebhookEventType::InvoicePaid
        );
        assert_eq!(
            WebhookEventType::parse("payment_intent.payment_failed"),
            WebhookEventType::PaymentIntentFailed
        );
        assert_eq!(
            WebhookEventType::parse("customer.created"),
            WebhookEventType::Other
        );
    }

    #[tokio::test]
    async fn test_rejects_missing_and_bad_signature() {
        let state = test_support::test_state().await;
        let payload = event("evt_1", "invoice.paid", serde_json::json!({"id": "in_1"}));

        let err = handle(&state, payload.as_bytes(), None).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::WebhookSignatureMissing);

        let forged = sign_now(payload.as_bytes(), "whsec_wrong");
        let err = handle(&state, payload.as_bytes(), Some(&forged))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::WebhookSignatureInvalid);

        let stale = crate::stripe::testing::sign(
            payload.as_bytes(),
            TEST_WEBHOOK_SECRET,
            chrono::Utc::now().timestamp() - 600,
        );
        let err = handle(&state, payload.as_bytes(), Some(&stale))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::WebhookTimestampExpired);

        // nothing persisted before verification
        assert!(
            db::webhook_events::find(&state.pool, "evt_1")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_duplicate_paid_event_is_noop() {
        let state = test_support::test_state().await;
        let (_, record_id) = seed_open_deposit(&state).await;
        let payload = event("evt_paid", "invoice.paid", serde_json::json!({"id": "in_dep"}));

        assert_eq!(deliver(&state, &payload).await.unwrap(), WebhookOutcome::Processed);
        let first = db::invoice_records::find_by_id(&state.pool, record_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first.status, PaymentRecordStatus::Paid);

        assert_eq!(deliver(&state, &payload).await.unwrap(), WebhookOutcome::Duplicate);
        let second = db::invoice_records::find_by_id(&state.pool, record_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(second.updated_at, first.updated_at);

        let stored = db::webhook_events::find(&state.pool, "evt_paid")
            .await
            .unwrap()
            .unwrap();
        assert!(stored.processed_at.is_some());
        assert_eq!(stored.event_type, "invoice.paid");
    }

    #[tokio::test]
    async fn test_deposit_alone_does_not_complete() {
        let state = test_support::test_state().await;
        let (estimate_id, _) = seed_open_deposit(&state).await;
        let payload = event("evt_paid", "invoice.paid", serde_json::json!({"id": "in_dep"}));
        deliver(&state, &payload).await.unwrap();

        let estimate = db::estimates::find_by_id(&state.pool, estimate_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(estimate.status, EstimateStatus::Accepted);
    }

    #[tokio::test]
    async fn test_finalized_backfills_by_metadata() {
        let state = test_support::test_state().await;
        let org = test_support::seed_org(&state.pool, Some("acct_1")).await;
        let customer = test_support::seed_customer(&state.pool, org.id).await;
        let estimate =
            test_support::seed_accepted_estimate(&state.pool, org.id, customer.id, 10_000).await;
        let record = test_support::seed_record(
            &state.pool,
            estimate.id,
            SplitKind::Deposit,
            None,
            PaymentRecordStatus::Pending,
        )
        .await;

        let payload = event(
            "evt_fin",
            "invoice.finalized",
            serde_json::json!({
                "id": "in_late",
                "hosted_invoice_url": "https://pay.test/in_late",
                "metadata": {"invoice_record_id": record.id.to_string()}
            }),
        );
        deliver(&state, &payload).await.unwrap();

        let stored = db::invoice_records::find_by_id(&state.pool, record.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.stripe_invoice_id.as_deref(), Some("in_late"));
        assert_eq!(stored.hosted_url.as_deref(), Some("https://pay.test/in_late"));
        assert_eq!(stored.status, PaymentRecordStatus::Open);
        // the platform fee stays at 6% of the half
        assert_eq!(stored.amount_cents, 5000);
        assert_eq!(stored.application_fee_cents, 300);
    }

    #[tokio::test]
    async fn test_paid_before_finalized_keeps_paid() {
        let state = test_support::test_state().await;
        let (_, record_id) = seed_open_deposit(&state).await;

        let paid = event("evt_a", "invoice.paid", serde_json::json!({"id": "in_dep"}));
        deliver(&state, &paid).await.unwrap();
        let finalized = event(
            "evt_b",
            "invoice.finalized",
            serde_json::json!({"id": "in_dep", "hosted_invoice_url": "https://pay.test/new"}),
        );
        deliver(&state, &finalized).await.unwrap();

        let stored = db::invoice_records::find_by_id(&state.pool, record_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, PaymentRecordStatus::Paid);
        assert_eq!(stored.hosted_url.as_deref(), Some("https://pay.test/new"));
    }

    #[tokio::test]
    async fn test_unknown_and_unmatched_events_are_acknowledged() {
        let state = test_support::test_state().await;

        let unknown = event("evt_x", "customer.created", serde_json::json!({"id": "cus_1"}));
        assert_eq!(deliver(&state, &unknown).await.unwrap(), WebhookOutcome::Processed);

        let unmatched = event("evt_y", "invoice.paid", serde_json::json!({"id": "in_nope"}));
        assert_eq!(deliver(&state, &unmatched).await.unwrap(), WebhookOutcome::Processed);

        let intent = event(
            "evt_z",
            "payment_intent.succeeded",
            serde_json::json!({"id": "pi_1"}),
        );
        assert_eq!(deliver(&state, &intent).await.unwrap(), WebhookOutcome::Processed);
    }

    #[tokio::test]
    async fn test_failed_handler_is_retried_on_redelivery() {
        let state = test_support::test_state().await;
        let (_, record_id) = seed_open_deposit(&state).await;

        // invoice object without an id makes the handler fail
        let broken = event("evt_retry", "invoice.paid", serde_json::json!({}));
        let err = deliver(&state, &broken).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        let stored = db::webhook_events::find(&state.pool, "evt_retry")
            .await
            .unwrap()
            .unwrap();
        assert!(stored.processed_at.is_none());

        // same event id redelivered (fixed payload): handler runs again
        let fixed = event("evt_retry", "invoice.paid", serde_json::json!({"id": "in_dep"}));
        assert_eq!(deliver(&state, &fixed).await.unwrap(), WebhookOutcome::Processed);
        let record = db::invoice_records::find_by_id(&state.pool, record_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.status, PaymentRecordStatus::Paid);
    }
}
