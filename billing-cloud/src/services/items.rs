//! Catalog items

use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Item, ItemCreate, ItemUpdate, ListQuery, PaginatedResponse};
use shared::util::{now_millis, snowflake_id};
use sqlx::SqlitePool;

use super::{normalize, page, require_text};
use crate::db;
use crate::error::ServiceResult;

const DEFAULT_UNIT: &str = "each";

fn non_negative(value: i64, field: &str) -> AppResult<i64> {
    if value < 0 {
        return Err(AppError::with_message(
            ErrorCode::InvalidAmount,
            format!("{field} must be non-negative, got {value}"),
        )
        .with_detail("field", field));
    }
    Ok(value)
}

pub async fn create(pool: &SqlitePool, req: ItemCreate) -> ServiceResult<Item> {
    if db::organizations::find_by_id(pool, req.org_id).await?.is_none() {
        return Err(AppError::new(ErrorCode::OrganizationNotFound).into());
    }

    let now = now_millis();
    let item = Item {
        id: snowflake_id(),
        org_id: req.org_id,
        name: require_text(&req.name, "name")?,
        description: normalize(req.description),
        sku: normalize(req.sku),
        price_cents: non_negative(req.price_cents, "price_cents")?,
        cost_cents: non_negative(req.cost_cents.unwrap_or(0), "cost_cents")?,
        category: normalize(req.category),
        unit: normalize(req.unit).unwrap_or_else(|| DEFAULT_UNIT.to_string()),
        taxable: req.taxable.unwrap_or(true),
        active: req.active.unwrap_or(true),
        notes: normalize(req.notes),
        created_at: now,
        updated_at: now,
    };
    db::items::insert(pool, &item).await?;
    Ok(item)
}

pub async fn get(pool: &SqlitePool, id: i64) -> ServiceResult<Item> {
    Ok(db::items::find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ItemNotFound))?)
}

pub async fn list(pool: &SqlitePool, q: &ListQuery) -> ServiceResult<PaginatedResponse<Item>> {
    let (rows, total) = db::items::list(pool, q).await?;
    Ok(page(rows, total, q))
}

pub async fn update(pool: &SqlitePool, id: i64, req: ItemUpdate) -> ServiceResult<Item> {
    let mut item = get(pool, id).await?;

    if let Some(name) = req.name {
        item.name = require_text(&name, "name")?;
    }
    if req.description.is_some() {
        item.description = normalize(req.description);
    }
    if req.sku.is_some() {
        item.sku = normalize(req.sku);
    }
    if let Some(price) = req.price_cents {
        item.price_cents = non_negative(price, "price_cents")?;
    }
    if let Some(cost) = req.cost_cents {
        item.cost_cents = non_negative(cost, "cost_cents")?;
    }
    if req.category.is_some() {
        item.category = normalize(req.category);
    }
    if let Some(unit) = normalize(req.unit) {
        item.unit = unit;
    }
    if let Some(taxable) = req.taxable {
        item.taxable = taxable;
    }
    if let Some(active) = req.active {
        item.active = active;
    }
    if req.notes.is_some() {
        item.notes = normalize(req.notes);
    }
    item.updated_at = now_millis();

    if !db::items::update(pool, &item).await? {
        return Err(AppError::new(ErrorCode::ItemNotFound).into());
    }
    Ok(item)
}

pub async fn delete(pool: &SqlitePool, id: i64) -> ServiceResult<()> {
    if !db::items::delete(pool, id).await? {
        return Err(AppError::new(ErrorCode::ItemNotFound).into());
    }
    Ok(())
}
