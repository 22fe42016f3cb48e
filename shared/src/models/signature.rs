//! Signature & Contract Snapshot Models
//!
//! Both are written in the same transaction that accepts an estimate and are
//! immutable afterwards.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Signature {
    pub id: i64,
    pub estimate_id: i64,
    pub signer_name: String,
    /// Client network origin (`x-forwarded-for`), `unknown` when absent
    pub ip_address: String,
    pub signed_at: i64,
}

/// Frozen copy of the contract text the customer agreed to
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ContractSnapshot {
    pub id: i64,
    pub estimate_id: i64,
    pub content: String,
    pub created_at: i64,
}
