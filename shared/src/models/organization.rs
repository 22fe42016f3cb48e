//! Organization Model

use serde::{Deserialize, Serialize};

/// How an organization collects payments
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum BillingMode {
    /// Platform account collects directly
    Single,
    /// Payments go to the organization's connected account
    Connect,
}

/// Organization entity (tenant boundary)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Organization {
    pub id: i64,
    pub name: String,
    pub billing_mode: BillingMode,
    /// Connected payment-provider account (`acct_...`)
    pub stripe_account_id: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create organization payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizationCreate {
    pub name: String,
    pub billing_mode: Option<BillingMode>,
}

/// Link a connected payment account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentAccountLink {
    pub stripe_account_id: String,
}

/// Contract template. At most one is active per organization; its content
/// is frozen into a contract snapshot when an estimate is accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ContractTemplate {
    pub id: i64,
    pub org_id: i64,
    pub name: String,
    pub content: String,
    pub is_active: bool,
    pub created_at: i64,
}

/// Create contract template payload (becomes the active template)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractTemplateCreate {
    pub name: String,
    pub content: String,
}
