//! Invoice Model
//!
//! Same shape as an estimate but an independent entity with its own number
//! series and status set.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::line_item::{LineItem, LineItemInput};
use crate::error::{AppError, AppResult, ErrorCode};

/// Invoice lifecycle. `overdue` is set by an explicit call, not by a timer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Paid,
    Overdue,
    Cancelled,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Sent => "sent",
            Self::Paid => "paid",
            Self::Overdue => "overdue",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn can_transition_to(&self, next: InvoiceStatus) -> bool {
        use InvoiceStatus::*;
        matches!(
            (self, next),
            (Draft, Sent)
                | (Draft, Cancelled)
                | (Sent, Sent)
                | (Sent, Paid)
                | (Sent, Overdue)
                | (Sent, Cancelled)
                | (Overdue, Paid)
                | (Overdue, Cancelled)
        )
    }

    pub fn transition(self, next: InvoiceStatus) -> AppResult<InvoiceStatus> {
        if !self.can_transition_to(next) {
            return Err(AppError::with_message(
                ErrorCode::InvoiceInvalidTransition,
                format!(
                    "Invoice cannot move from {} to {}",
                    self.as_str(),
                    next.as_str()
                ),
            )
            .with_detail("from", self.as_str())
            .with_detail("to", next.as_str()));
        }
        Ok(next)
    }
}

/// Invoice entity (header row)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Invoice {
    pub id: i64,
    pub org_id: i64,
    pub customer_id: i64,
    /// `INV-NNN`, unique per organization
    pub number: String,
    pub issue_date: String,
    pub due_date: Option<String>,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
    pub status: InvoiceStatus,
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Invoice {
    pub fn totals(&self) -> crate::money::Totals {
        crate::money::Totals {
            subtotal_cents: self.subtotal_cents,
            tax_cents: self.tax_cents,
            discount_cents: self.discount_cents,
            total_cents: self.total_cents,
        }
    }
}

/// Invoice with its line items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceDetail {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub line_items: Vec<LineItem>,
}

/// Create invoice payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceCreate {
    pub org_id: i64,
    pub customer_id: i64,
    pub issue_date: String,
    pub due_date: Option<String>,
    pub tax_rate: Option<Decimal>,
    pub discount_cents: Option<i64>,
    pub notes: Option<String>,
    pub line_items: Vec<LineItemInput>,
}

/// Update invoice payload (same replace-on-write semantics as estimates)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvoiceUpdate {
    pub customer_id: Option<i64>,
    pub issue_date: Option<String>,
    pub due_date: Option<String>,
    pub subtotal_cents: Option<i64>,
    pub tax_cents: Option<i64>,
    pub discount_cents: Option<i64>,
    pub total_cents: Option<i64>,
    pub status: Option<InvoiceStatus>,
    pub notes: Option<String>,
    pub line_items: Option<Vec<LineItemInput>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use InvoiceStatus::*;

    #[test]
    fn test_cancel_from_any_unpaid_state() {
        assert!(Draft.can_transition_to(Cancelled));
        assert!(Sent.can_transition_to(Cancelled));
        assert!(Overdue.can_transition_to(Cancelled));
        assert!(!Paid.can_transition_to(Cancelled));
    }

    #[test]
    fn test_overdue_only_from_sent() {
        assert!(Sent.can_transition_to(Overdue));
        assert!(!Draft.can_transition_to(Overdue));
        assert!(Overdue.can_transition_to(Paid));
    }

    #[test]
    fn test_paid_is_final() {
        for next in [Draft, Sent, Paid, Overdue, Cancelled] {
            assert!(!Paid.can_transition_to(next));
        }
        let err = Paid.transition(Sent).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvoiceInvalidTransition);
    }
}
