//! Split-payment ledger (InvoiceRecord)

use serde::{Deserialize, Serialize};

/// Which half of a split payment a record bills
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum SplitKind {
    Deposit,
    Balance,
}

impl SplitKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deposit => "deposit",
            Self::Balance => "balance",
        }
    }

    /// Line item description prefix shown on the remote invoice
    pub fn label(&self) -> &'static str {
        match self {
            Self::Deposit => "Deposit",
            Self::Balance => "Balance",
        }
    }
}

/// Ledger entry state
///
/// `pending` is written before any remote call; it moves to `open` once the
/// remote invoice is finalized, and to `paid` from the webhook.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum PaymentRecordStatus {
    Pending,
    Open,
    Paid,
}

/// Ledger entry tracking one remote invoice tied to an estimate. Never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct InvoiceRecord {
    pub id: i64,
    pub estimate_id: i64,
    pub kind: SplitKind,
    /// Remote invoice id (`in_...`), set once created remotely
    pub stripe_invoice_id: Option<String>,
    pub hosted_url: Option<String>,
    pub amount_cents: i64,
    /// Platform fee computed for this charge. Not attached to the remote invoice.
    pub application_fee_cents: i64,
    pub status: PaymentRecordStatus,
    /// Prefix of the idempotency keys sent to the provider
    pub idempotency_key: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Deposit or balance request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitPaymentRequest {
    pub estimate_id: i64,
}

/// Outcome of a split-payment request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitPaymentResponse {
    pub record_id: i64,
    pub hosted_url: String,
    /// Remote invoice id
    pub invoice_id: String,
    pub amount_cents: i64,
}
