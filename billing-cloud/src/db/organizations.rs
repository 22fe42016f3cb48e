//! Organization queries

use shared::models::Organization;
use sqlx::{SqliteExecutor, SqlitePool};

const COLUMNS: &str = "id, name, billing_mode, stripe_account_id, created_at, updated_at";

pub async fn insert(pool: &SqlitePool, org: &Organization) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO organizations (id, name, billing_mode, stripe_account_id, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(org.id)
    .bind(&org.name)
    .bind(org.billing_mode)
    .bind(&org.stripe_account_id)
    .bind(org.created_at)
    .bind(org.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn find_by_id(
    executor: impl SqliteExecutor<'_>,
    id: i64,
) -> Result<Option<Organization>, sqlx::Error> {
    sqlx::query_as(&format!("SELECT {COLUMNS} FROM organizations WHERE id = ?"))
        .bind(id)
        .fetch_optional(executor)
        .await
}

/// Returns `false` when the organization does not exist
pub async fn set_stripe_account(
    executor: impl SqliteExecutor<'_>,
    id: i64,
    stripe_account_id: &str,
    now: i64,
) -> Result<bool, sqlx::Error> {
    let rows = sqlx::query(
        "UPDATE organizations SET stripe_account_id = ?, updated_at = ? WHERE id = ?",
    )
    .bind(stripe_account_id)
    .bind(now)
    .bind(id)
    .execute(executor)
    .await?;
    Ok(rows.rows_affected() > 0)
}
