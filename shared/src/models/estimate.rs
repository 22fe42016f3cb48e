//! Estimate Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::line_item::{LineItem, LineItemInput};
use super::payment::InvoiceRecord;
use super::signature::{ContractSnapshot, Signature};
use crate::error::{AppError, AppResult, ErrorCode};

/// Estimate lifecycle
///
/// ```text
/// draft ──> sent ──> accepted ──> completed
///   │  └────────────────^
///   └──> cancelled <── sent
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum EstimateStatus {
    Draft,
    Sent,
    Accepted,
    Completed,
    Cancelled,
}

impl EstimateStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Sent => "sent",
            Self::Accepted => "accepted",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether `self -> next` is an allowed edge. Re-sending a sent estimate
    /// is allowed.
    pub fn can_transition_to(&self, next: EstimateStatus) -> bool {
        use EstimateStatus::*;
        matches!(
            (self, next),
            (Draft, Sent)
                | (Draft, Accepted)
                | (Draft, Cancelled)
                | (Sent, Sent)
                | (Sent, Accepted)
                | (Sent, Cancelled)
                | (Accepted, Completed)
        )
    }

    /// Validate `self -> next`, returning `next`.
    pub fn transition(self, next: EstimateStatus) -> AppResult<EstimateStatus> {
        if !self.can_transition_to(next) {
            return Err(AppError::with_message(
                ErrorCode::EstimateInvalidTransition,
                format!(
                    "Estimate cannot move from {} to {}",
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

/// Estimate entity (header row)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Estimate {
    pub id: i64,
    pub org_id: i64,
    pub customer_id: i64,
    /// `EST-NNN`, unique per organization
    pub number: String,
    /// YYYY-MM-DD
    pub issue_date: String,
    /// YYYY-MM-DD
    pub valid_until: Option<String>,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
    pub status: EstimateStatus,
    pub signature_id: Option<i64>,
    pub contract_id: Option<i64>,
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Estimate {
    pub fn totals(&self) -> crate::money::Totals {
        crate::money::Totals {
            subtotal_cents: self.subtotal_cents,
            tax_cents: self.tax_cents,
            discount_cents: self.discount_cents,
            total_cents: self.total_cents,
        }
    }
}

/// Estimate with its line items, payment ledger and acceptance record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimateDetail {
    #[serde(flatten)]
    pub estimate: Estimate,
    pub line_items: Vec<LineItem>,
    pub payments: Vec<InvoiceRecord>,
    pub signature: Option<Signature>,
    pub contract: Option<ContractSnapshot>,
}

/// Create estimate payload. Totals are computed from the line items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimateCreate {
    pub org_id: i64,
    pub customer_id: i64,
    pub issue_date: String,
    pub valid_until: Option<String>,
    /// Fraction in [0, 1], default 0
    pub tax_rate: Option<Decimal>,
    pub discount_cents: Option<i64>,
    pub notes: Option<String>,
    pub line_items: Vec<LineItemInput>,
}

/// Update estimate payload
///
/// Supplied `line_items` replace the stored set wholesale. Totals are not
/// recomputed from them; the resulting header must still add up.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EstimateUpdate {
    pub customer_id: Option<i64>,
    pub issue_date: Option<String>,
    pub valid_until: Option<String>,
    pub subtotal_cents: Option<i64>,
    pub tax_cents: Option<i64>,
    pub discount_cents: Option<i64>,
    pub total_cents: Option<i64>,
    pub status: Option<EstimateStatus>,
    pub notes: Option<String>,
    pub line_items: Option<Vec<LineItemInput>>,
}

/// Accept (sign) an estimate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimateAccept {
    pub signer_name: String,
    /// Overrides the organization's active contract template
    pub contract_content: Option<String>,
}

/// Result of a successful acceptance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Acceptance {
    pub estimate: Estimate,
    pub signature: Signature,
    pub contract: ContractSnapshot,
}

/// Result of sending an estimate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimateSent {
    pub estimate: Estimate,
    pub public_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use EstimateStatus::*;

    #[test]
    fn test_allowed_transitions() {
        assert!(Draft.can_transition_to(Sent));
        assert!(Draft.can_transition_to(Cancelled));
        assert!(Sent.can_transition_to(Sent));
        assert!(Sent.can_transition_to(Accepted));
        assert!(Accepted.can_transition_to(Completed));
    }

    #[test]
    fn test_rejected_transitions() {
        assert!(!Accepted.can_transition_to(Cancelled));
        assert!(!Accepted.can_transition_to(Accepted));
        assert!(!Completed.can_transition_to(Draft));
        assert!(!Cancelled.can_transition_to(Sent));
        assert!(!Draft.can_transition_to(Completed));
    }

    #[test]
    fn test_transition_error() {
        let err = Completed.transition(Sent).unwrap_err();
        assert_eq!(err.code, ErrorCode::EstimateInvalidTransition);
        assert_eq!(err.message, "Estimate cannot move from completed to sent");
        assert_eq!(Sent.transition(Accepted).unwrap(), Accepted);
    }

    #[test]
    fn test_status_serde() {
        assert_eq!(serde_json::to_string(&Accepted).unwrap(), "\"accepted\"");
        let status: EstimateStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(status, Cancelled);
    }
}
