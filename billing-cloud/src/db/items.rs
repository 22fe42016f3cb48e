//! Catalog item queries

use shared::models::{Item, ListQuery};
use sqlx::SqlitePool;

const SELECT: &str = "SELECT id, org_id, name, description, sku, price_cents, cost_cents, category, unit, taxable, active, notes, created_at, updated_at FROM items";

pub async fn insert(pool: &SqlitePool, item: &Item) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO items (id, org_id, name, description, sku, price_cents, cost_cents, category, unit, taxable, active, notes, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(item.id)
    .bind(item.org_id)
    .bind(&item.name)
    .bind(&item.description)
    .bind(&item.sku)
    .bind(item.price_cents)
    .bind(item.cost_cents)
    .bind(&item.category)
    .bind(&item.unit)
    .bind(item.taxable)
    .bind(item.active)
    .bind(&item.notes)
    .bind(item.created_at)
    .bind(item.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Item>, sqlx::Error> {
    sqlx::query_as(&format!("{SELECT} WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Page of items in an organization, filtered by name or SKU.
pub async fn list(pool: &SqlitePool, q: &ListQuery) -> Result<(Vec<Item>, i64), sqlx::Error> {
    let pattern = q.like_pattern();
    let filter = "WHERE org_id = ?1 AND (?2 IS NULL OR lower(name) LIKE ?2 ESCAPE '\\' OR lower(coalesce(sku, '')) LIKE ?2 ESCAPE '\\')";

    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM items {filter}"))
        .bind(q.org_id)
        .bind(&pattern)
        .fetch_one(pool)
        .await?;

    let rows = sqlx::query_as(&format!(
        "{SELECT} {filter} ORDER BY name COLLATE NOCASE, id LIMIT ?3 OFFSET ?4"
    ))
    .bind(q.org_id)
    .bind(&pattern)
    .bind(i64::from(q.limit()))
    .bind(q.offset())
    .fetch_all(pool)
    .await?;

    Ok((rows, total))
}

pub async fn update(pool: &SqlitePool, item: &Item) -> Result<bool, sqlx::Error> {
    let rows = sqlx::query(
        "UPDATE items SET name = ?, description = ?, sku = ?, price_cents = ?, cost_cents = ?, category = ?, unit = ?, taxable = ?, active = ?, notes = ?, updated_at = ?
         WHERE id = ?",
    )
    .bind(&item.name)
    .bind(&item.description)
    .bind(&item.sku)
    .bind(item.price_cents)
    .bind(item.cost_cents)
    .bind(&item.category)
    .bind(&item.unit)
    .bind(item.taxable)
    .bind(item.active)
    .bind(&item.notes)
    .bind(item.updated_at)
    .bind(item.id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn delete(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let rows = sqlx::query("DELETE FROM items WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
