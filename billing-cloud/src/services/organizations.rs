//! Organizations, payment account linkage and contract templates

use shared::error::{AppError, ErrorCode};
use shared::models::{
    BillingMode, ContractTemplate, ContractTemplateCreate, Organization, OrganizationCreate,
};
use shared::util::{now_millis, snowflake_id};
use sqlx::SqlitePool;

use super::require_text;
use crate::db;
use crate::error::ServiceResult;

pub async fn create(pool: &SqlitePool, req: OrganizationCreate) -> ServiceResult<Organization> {
    let now = now_millis();
    let org = Organization {
        id: snowflake_id(),
        name: require_text(&req.name, "name")?,
        billing_mode: req.billing_mode.unwrap_or(BillingMode::Connect),
        stripe_account_id: None,
        created_at: now,
        updated_at: now,
    };
    db::organizations::insert(pool, &org).await?;
    tracing::info!(org_id = org.id, "Organization created");
    Ok(org)
}

pub async fn get(pool: &SqlitePool, id: i64) -> ServiceResult<Organization> {
    Ok(db::organizations::find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::OrganizationNotFound))?)
}

/// Attach the organization's connected Stripe account (`acct_...`).
///
/// Remote customers live on the connected account, so moving to a different
/// account forgets every customer id mirrored from the old one.
pub async fn link_payment_account(
    pool: &SqlitePool,
    id: i64,
    stripe_account_id: &str,
) -> ServiceResult<Organization> {
    let account = stripe_account_id.trim();
    if !account.starts_with("acct_") || account.len() <= "acct_".len() {
        return Err(AppError::with_message(
            ErrorCode::InvalidFormat,
            "stripe_account_id must look like acct_...",
        )
        .with_detail("field", "stripe_account_id")
        .into());
    }
    let now = now_millis();
    let mut tx = pool.begin().await?;
    let reset = db::customers::reset_stripe_customers(&mut *tx, id, account, now).await?;
    if !db::organizations::set_stripe_account(&mut *tx, id, account, now).await? {
        return Err(AppError::new(ErrorCode::OrganizationNotFound).into());
    }
    tx.commit().await?;

    if reset > 0 {
        tracing::warn!(org_id = id, customers = reset, "Remote customers reset by account change");
    }
    tracing::info!(org_id = id, account = account, "Payment account linked");
    get(pool, id).await
}

/// Make `req` the organization's active contract template, retiring the
/// previous one.
pub async fn set_contract_template(
    pool: &SqlitePool,
    org_id: i64,
    req: ContractTemplateCreate,
) -> ServiceResult<ContractTemplate> {
    let template = ContractTemplate {
        id: snowflake_id(),
        org_id,
        name: require_text(&req.name, "name")?,
        content: require_text(&req.content, "content")?,
        is_active: true,
        created_at: now_millis(),
    };

    let mut tx = pool.begin().await?;
    if db::organizations::find_by_id(&mut *tx, org_id).await?.is_none() {
        return Err(AppError::new(ErrorCode::OrganizationNotFound).into());
    }
    db::contract_templates::replace_active(&mut tx, &template).await?;
    tx.commit().await?;

    Ok(template)
}

pub async fn active_contract_template(
    pool: &SqlitePool,
    org_id: i64,
) -> ServiceResult<ContractTemplate> {
    Ok(db::contract_templates::find_active(pool, org_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ContractTemplateNotFound))?)
}
