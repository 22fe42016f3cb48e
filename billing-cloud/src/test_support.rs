//! Fixtures shared by the unit tests

use std::str::FromStr;
use std::sync::Arc;

use shared::models::{
    Customer, CustomerCreate, Estimate, EstimateAccept, EstimateCreate, InvoiceRecord,
    LineItemInput, Organization, OrganizationCreate, PaymentRecordStatus, SplitKind,
};
use shared::money::{self, APPLICATION_FEE_RATE};
use shared::util::{now_millis, snowflake_id};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::config::Config;
use crate::db;
use crate::services;
use crate::state::AppState;
use crate::stripe::testing::{FakeProvider, sign};

pub const TEST_WEBHOOK_SECRET: &str = "whsec_test_secret";

/// Fresh in-memory database with migrations applied.
///
/// A single connection that never idles out, so every query sees the same
/// in-memory database.
pub async fn test_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .unwrap();
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();
    pool
}

pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".into(),
        http_port: 0,
        environment: "development".into(),
        stripe_secret_key: "sk_test".into(),
        stripe_webhook_secret: TEST_WEBHOOK_SECRET.into(),
        stripe_api_base: "http://stripe.invalid".into(),
        stripe_timeout_secs: 1,
        public_base_url: "https://billing.test".into(),
        currency: "brl".into(),
    }
}

pub async fn test_state() -> AppState {
    test_state_with(Arc::new(FakeProvider::default())).await
}

pub async fn test_state_with(provider: Arc<FakeProvider>) -> AppState {
    AppState::with_provider(test_pool().await, provider, &test_config())
}

pub fn line(description: &str, quantity: i64, unit_cents: i64) -> LineItemInput {
    LineItemInput {
        description: description.to_string(),
        additional_details: None,
        quantity,
        unit_cents,
    }
}

/// Organization, optionally linked to a connected account
pub async fn seed_org(pool: &SqlitePool, account: Option<&str>) -> Organization {
    let org = services::organizations::create(
        pool,
        OrganizationCreate {
            name: "Acme Painting".into(),
            billing_mode: None,
        },
    )
    .await
    .unwrap();
    match account {
        Some(acct) => services::organizations::link_payment_account(pool, org.id, acct)
            .await
            .unwrap(),
        None => org,
    }
}

pub async fn seed_customer(pool: &SqlitePool, org_id: i64) -> Customer {
    services::customers::create(
        pool,
        CustomerCreate {
            org_id,
            name: "Jane Homeowner".into(),
            email: Some("jane@example.com".into()),
            phone: None,
            address: None,
            city: None,
            state: None,
            zip_code: None,
            notes: None,
        },
    )
    .await
    .unwrap()
}

/// Draft estimate with a single untaxed line worth `total_cents`
pub async fn seed_estimate(
    pool: &SqlitePool,
    org_id: i64,
    customer_id: i64,
    total_cents: i64,
) -> Estimate {
    services::estimates::create(
        pool,
        EstimateCreate {
            org_id,
            customer_id,
            issue_date: "2026-03-01".into(),
            valid_until: None,
            tax_rate: None,
            discount_cents: None,
            notes: None,
            line_items: vec![line("Labor", 1, total_cents)],
        },
    )
    .await
    .unwrap()
    .estimate
}

pub async fn seed_accepted_estimate(
    pool: &SqlitePool,
    org_id: i64,
    customer_id: i64,
    total_cents: i64,
) -> Estimate {
    let estimate = seed_estimate(pool, org_id, customer_id, total_cents).await;
    services::estimates::accept(
        pool,
        estimate.id,
        EstimateAccept {
            signer_name: "Jane Homeowner".into(),
            contract_content: None,
        },
        Some("203.0.113.7"),
    )
    .await
    .unwrap()
    .estimate
}

/// Ledger record written directly, bypassing the orchestrator
pub async fn seed_record(
    pool: &SqlitePool,
    estimate_id: i64,
    kind: SplitKind,
    stripe_invoice_id: Option<&str>,
    status: PaymentRecordStatus,
) -> InvoiceRecord {
    let now = now_millis();
    let amount_cents = 5000;
    let record = InvoiceRecord {
        id: snowflake_id(),
        estimate_id,
        kind,
        stripe_invoice_id: stripe_invoice_id.map(str::to_string),
        hosted_url: None,
        amount_cents,
        application_fee_cents: money::application_fee(amount_cents, APPLICATION_FEE_RATE).unwrap(),
        status,
        idempotency_key: uuid::Uuid::new_v4().to_string(),
        created_at: now,
        updated_at: now,
    };
    let mut conn = pool.acquire().await.unwrap();
    db::invoice_records::insert(&mut conn, &record).await.unwrap();
    record
}

/// `Stripe-Signature` header for `payload` signed now
pub fn sign_now(payload: &[u8], secret: &str) -> String {
    sign(payload, secret, chrono::Utc::now().timestamp())
}
