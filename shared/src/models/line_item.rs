//! Line Item Model
//!
//! Estimates and invoices keep their line items in separate tables with the
//! same shape. `amount_cents` is stored at write time, never derived live.

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::money;

/// Line item entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct LineItem {
    pub id: i64,
    /// Owning estimate or invoice
    pub document_id: i64,
    pub position: i64,
    pub description: String,
    pub additional_details: Option<String>,
    pub quantity: i64,
    pub unit_cents: i64,
    pub amount_cents: i64,
}

/// Line item as submitted by the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItemInput {
    pub description: String,
    pub additional_details: Option<String>,
    pub quantity: i64,
    pub unit_cents: i64,
}

impl LineItemInput {
    /// Validate the line and return its `quantity × unit_cents` amount.
    pub fn amount_cents(&self) -> AppResult<i64> {
        if self.description.trim().is_empty() {
            return Err(AppError::required("description"));
        }
        money::line_amount(self.quantity, self.unit_cents)
    }
}

/// `(quantity, unit_cents)` pairs for [`money::subtotal`]
pub fn pricing(lines: &[LineItemInput]) -> impl Iterator<Item = (i64, i64)> + '_ {
    lines.iter().map(|l| (l.quantity, l.unit_cents))
}
