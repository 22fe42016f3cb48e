//! Contract template queries
//!
//! At most one template per organization is active (partial unique index).

use shared::models::ContractTemplate;
use sqlx::{SqliteConnection, SqliteExecutor};

pub async fn find_active(
    executor: impl SqliteExecutor<'_>,
    org_id: i64,
) -> Result<Option<ContractTemplate>, sqlx::Error> {
    sqlx::query_as(
        "SELECT id, org_id, name, content, is_active, created_at
         FROM contract_templates WHERE org_id = ? AND is_active = 1",
    )
    .bind(org_id)
    .fetch_optional(executor)
    .await
}

/// Deactivate the current template and insert `template` as the active one.
pub async fn replace_active(
    conn: &mut SqliteConnection,
    template: &ContractTemplate,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE contract_templates SET is_active = 0 WHERE org_id = ? AND is_active = 1")
        .bind(template.org_id)
        .execute(&mut *conn)
        .await?;
    sqlx::query(
        "INSERT INTO contract_templates (id, org_id, name, content, is_active, created_at)
         VALUES (?, ?, ?, ?, 1, ?)",
    )
    .bind(template.id)
    .bind(template.org_id)
    .bind(&template.name)
    .bind(&template.content)
    .bind(template.created_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}
