//! Error category and class classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the leading digit of the error code:
/// - 0xxx: General errors
/// - 1xxx: Webhook authentication errors
/// - 3xxx: Organization errors
/// - 4xxx: Estimate errors
/// - 5xxx: Payment errors
/// - 6xxx: Customer and catalog errors
/// - 7xxx: Invoice errors
/// - 9xxx: System errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    General,
    Webhook,
    Organization,
    Estimate,
    Payment,
    Customer,
    Invoice,
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            1000..2000 => Self::Webhook,
            3000..4000 => Self::Organization,
            4000..5000 => Self::Estimate,
            5000..6000 => Self::Payment,
            6000..7000 => Self::Customer,
            7000..8000 => Self::Invoice,
            _ => Self::System,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Webhook => "webhook",
            Self::Organization => "organization",
            Self::Estimate => "estimate",
            Self::Payment => "payment",
            Self::Customer => "customer",
            Self::Invoice => "invoice",
            Self::System => "system",
        }
    }
}

/// What kind of failure an error code represents, independent of the domain
/// area it belongs to. Drives the HTTP status and whether the error is logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// Malformed or out-of-range input, correctable by the caller
    Validation,
    /// Referenced entity absent
    NotFound,
    /// State-machine violation
    Conflict,
    /// Ordering violation (balance before deposit, unaccepted estimate)
    Precondition,
    /// Webhook signature rejected
    Authentication,
    /// Missing provider linkage on the organization
    Configuration,
    /// Payment provider call failed; safe to retry
    Upstream,
    /// Unexpected or persistence failure
    Internal,
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }

    /// Failure class of this code. `None` for [`ErrorCode::Success`].
    pub fn class(&self) -> Option<ErrorClass> {
        use ErrorClass::*;
        let class = match self {
            Self::Success => return None,

            Self::ValidationFailed
            | Self::InvalidRequest
            | Self::InvalidFormat
            | Self::RequiredField
            | Self::ValueOutOfRange
            | Self::TotalsMismatch
            | Self::DocumentEmpty
            | Self::InvalidAmount => Validation,

            Self::NotFound
            | Self::OrganizationNotFound
            | Self::ContractTemplateNotFound
            | Self::EstimateNotFound
            | Self::PaymentRecordNotFound
            | Self::CustomerNotFound
            | Self::ItemNotFound
            | Self::InvoiceNotFound => NotFound,

            Self::AlreadyExists
            | Self::EstimateAlreadyAccepted
            | Self::EstimateInvalidTransition
            | Self::SplitPaymentExists
            | Self::CustomerHasEstimates
            | Self::CustomerHasInvoices
            | Self::InvoiceAlreadyPaid
            | Self::InvoiceInvalidTransition => Conflict,

            Self::DepositNotPaid | Self::EstimateNotAccepted => Precondition,

            Self::WebhookSignatureMissing
            | Self::WebhookSignatureInvalid
            | Self::WebhookTimestampExpired => Authentication,

            Self::PaymentAccountNotLinked => Configuration,

            Self::PaymentProviderFailed | Self::NetworkError | Self::TimeoutError => Upstream,

            Self::Unknown | Self::InternalError | Self::DatabaseError | Self::ConfigError => {
                Internal
            }
        };
        Some(class)
    }
}
