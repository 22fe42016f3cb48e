//! Catalog Item Model
//!
//! Line items copy name and price at creation; nothing references an item
//! by foreign key.

use serde::{Deserialize, Serialize};

/// Catalog item entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Item {
    pub id: i64,
    pub org_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub sku: Option<String>,
    /// Price in cents
    pub price_cents: i64,
    /// Cost in cents (missing cost is stored as 0)
    pub cost_cents: i64,
    pub category: Option<String>,
    pub unit: String,
    pub taxable: bool,
    pub active: bool,
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create item payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemCreate {
    pub org_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub sku: Option<String>,
    pub price_cents: i64,
    pub cost_cents: Option<i64>,
    pub category: Option<String>,
    pub unit: Option<String>,
    pub taxable: Option<bool>,
    pub active: Option<bool>,
    pub notes: Option<String>,
}

/// Update item payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub sku: Option<String>,
    pub price_cents: Option<i64>,
    pub cost_cents: Option<i64>,
    pub category: Option<String>,
    pub unit: Option<String>,
    pub taxable: Option<bool>,
    pub active: Option<bool>,
    pub notes: Option<String>,
}
