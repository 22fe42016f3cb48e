//! Per-organization document numbers (`EST-001`, `INV-042`)

use serde::{Deserialize, Serialize};

/// Kind of numbered document. Each kind has its own series per organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Estimate,
    Invoice,
}

impl DocumentKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Estimate => "EST",
            Self::Invoice => "INV",
        }
    }

    /// Key stored in the counter table
    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Estimate => "estimate",
            Self::Invoice => "invoice",
        }
    }
}

/// Format the `sequence`-th document number, zero-padded to three digits.
/// Sequences past 999 keep growing (`EST-1000`).
pub fn format_number(kind: DocumentKind, sequence: i64) -> String {
    format!("{}-{:03}", kind.prefix(), sequence)
}
