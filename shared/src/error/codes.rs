//! Unified error codes for the billing service
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Webhook authentication errors
//! - 3xxx: Organization errors
//! - 4xxx: Estimate errors
//! - 5xxx: Payment errors
//! - 6xxx: Customer and catalog errors
//! - 7xxx: Invoice errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values so API clients can match on
/// them without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Webhook ====================
    /// Stripe-Signature header missing
    WebhookSignatureMissing = 1001,
    /// Signature does not match the payload
    WebhookSignatureInvalid = 1002,
    /// Signed timestamp outside the tolerance window
    WebhookTimestampExpired = 1003,

    // ==================== 3xxx: Organization ====================
    /// Organization not found
    OrganizationNotFound = 3001,
    /// No connected payment account linked
    PaymentAccountNotLinked = 3002,
    /// Contract template not found
    ContractTemplateNotFound = 3003,

    // ==================== 4xxx: Estimate ====================
    /// Estimate not found
    EstimateNotFound = 4001,
    /// Estimate has already been accepted
    EstimateAlreadyAccepted = 4002,
    /// Status change not allowed from the current state
    EstimateInvalidTransition = 4003,
    /// Header totals do not add up
    TotalsMismatch = 4004,
    /// Estimate must be accepted first
    EstimateNotAccepted = 4005,
    /// Document has no line items
    DocumentEmpty = 4006,

    // ==================== 5xxx: Payment ====================
    /// Balance requested before the deposit was paid
    DepositNotPaid = 5001,
    /// A split invoice of this type already exists
    SplitPaymentExists = 5002,
    /// Payment provider call failed
    PaymentProviderFailed = 5003,
    /// Payment ledger entry not found
    PaymentRecordNotFound = 5004,
    /// Monetary amount is negative or overflows
    InvalidAmount = 5005,

    // ==================== 6xxx: Customer & Catalog ====================
    /// Customer not found
    CustomerNotFound = 6001,
    /// Customer still owns estimates
    CustomerHasEstimates = 6002,
    /// Catalog item not found
    ItemNotFound = 6003,
    /// Customer still owns invoices
    CustomerHasInvoices = 6004,

    // ==================== 7xxx: Invoice ====================
    /// Invoice not found
    InvoiceNotFound = 7001,
    /// Invoice has already been paid
    InvoiceAlreadyPaid = 7002,
    /// Status change not allowed from the current state
    InvoiceInvalidTransition = 7003,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Network error
    NetworkError = 9003,
    /// Operation timed out
    TimeoutError = 9004,
    /// Server configuration error
    ConfigError = 9005,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the default message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Success",
            ErrorCode::Unknown => "Unknown error",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field missing",
            ErrorCode::ValueOutOfRange => "Value out of range",

            // Webhook
            ErrorCode::WebhookSignatureMissing => "Missing Stripe-Signature header",
            ErrorCode::WebhookSignatureInvalid => "Webhook signature mismatch",
            ErrorCode::WebhookTimestampExpired => "Webhook timestamp too old",

            // Organization
            ErrorCode::OrganizationNotFound => "Organization not found",
            ErrorCode::PaymentAccountNotLinked => {
                "Organization has no connected payment account"
            }
            ErrorCode::ContractTemplateNotFound => "Contract template not found",

            // Estimate
            ErrorCode::EstimateNotFound => "Estimate not found",
            ErrorCode::EstimateAlreadyAccepted => "Estimate has already been accepted",
            ErrorCode::EstimateInvalidTransition => "Estimate status change not allowed",
            ErrorCode::TotalsMismatch => "Total must equal subtotal + tax - discount",
            ErrorCode::EstimateNotAccepted => "Estimate must be accepted before billing",
            ErrorCode::DocumentEmpty => "At least one line item is required",

            // Payment
            ErrorCode::DepositNotPaid => "Deposit must be settled first",
            ErrorCode::SplitPaymentExists => "Split invoice already issued",
            ErrorCode::PaymentProviderFailed => "Payment provider request failed",
            ErrorCode::PaymentRecordNotFound => "Payment record not found",
            ErrorCode::InvalidAmount => "Invalid monetary amount",

            // Customer & Catalog
            ErrorCode::CustomerNotFound => "Customer not found",
            ErrorCode::CustomerHasEstimates => "Customer has estimates",
            ErrorCode::ItemNotFound => "Item not found",
            ErrorCode::CustomerHasInvoices => "Customer has invoices",

            // Invoice
            ErrorCode::InvoiceNotFound => "Invoice not found",
            ErrorCode::InvoiceAlreadyPaid => "Paid invoices cannot be deleted",
            ErrorCode::InvoiceInvalidTransition => "Invoice status change not allowed",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Webhook
            1001 => Ok(ErrorCode::WebhookSignatureMissing),
            1002 => Ok(ErrorCode::WebhookSignatureInvalid),
            1003 => Ok(ErrorCode::WebhookTimestampExpired),

            // Organization
            3001 => Ok(ErrorCode::OrganizationNotFound),
            3002 => Ok(ErrorCode::PaymentAccountNotLinked),
            3003 => Ok(ErrorCode::ContractTemplateNotFound),

            // Estimate
            4001 => Ok(ErrorCode::EstimateNotFound),
            4002 => Ok(ErrorCode::EstimateAlreadyAccepted),
            4003 => Ok(ErrorCode::EstimateInvalidTransition),
            4004 => Ok(ErrorCode::TotalsMismatch),
            4005 => Ok(ErrorCode::EstimateNotAccepted),
            4006 => Ok(ErrorCode::DocumentEmpty),

            // Payment
            5001 => Ok(ErrorCode::DepositNotPaid),
            5002 => Ok(ErrorCode::SplitPaymentExists),
            5003 => Ok(ErrorCode::PaymentProviderFailed),
            5004 => Ok(ErrorCode::PaymentRecordNotFound),
            5005 => Ok(ErrorCode::InvalidAmount),

            // Customer & Catalog
            6001 => Ok(ErrorCode::CustomerNotFound),
            6002 => Ok(ErrorCode::CustomerHasEstimates),
            6003 => Ok(ErrorCode::ItemNotFound),
            6004 => Ok(ErrorCode::CustomerHasInvoices),

            // Invoice
            7001 => Ok(ErrorCode::InvoiceNotFound),
            7002 => Ok(ErrorCode::InvoiceAlreadyPaid),
            7003 => Ok(ErrorCode::InvoiceInvalidTransition),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::NetworkError),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::ValidationFailed.code(), 2);
        assert_eq!(ErrorCode::WebhookSignatureInvalid.code(), 1002);
        assert_eq!(ErrorCode::PaymentAccountNotLinked.code(), 3002);
        assert_eq!(ErrorCode::EstimateAlreadyAccepted.code(), 4002);
        assert_eq!(ErrorCode::DepositNotPaid.code(), 5001);
        assert_eq!(ErrorCode::CustomerHasEstimates.code(), 6002);
        assert_eq!(ErrorCode::InvoiceAlreadyPaid.code(), 7002);
        assert_eq!(ErrorCode::InternalError.code(), 9001);
    }

    #[test]
    fn test_is_success() {
        assert!(ErrorCode::Success.is_success());
        assert!(!ErrorCode::Unknown.is_success());
        assert!(!ErrorCode::DepositNotPaid.is_success());
    }

    #[test]
    fn test_try_from_valid() {
        assert_eq!(ErrorCode::try_from(0), Ok(ErrorCode::Success));
        assert_eq!(ErrorCode::try_from(1003), Ok(ErrorCode::WebhookTimestampExpired));
        assert_eq!(ErrorCode::try_from(5002), Ok(ErrorCode::SplitPaymentExists));
        assert_eq!(ErrorCode::try_from(9005), Ok(ErrorCode::ConfigError));
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(999), Err(InvalidErrorCode(999)));
        assert_eq!(ErrorCode::try_from(2001), Err(InvalidErrorCode(2001)));
        assert_eq!(ErrorCode::try_from(65535), Err(InvalidErrorCode(65535)));
    }

    #[test]
    fn test_serialize() {
        let json = serde_json::to_string(&ErrorCode::DepositNotPaid).unwrap();
        assert_eq!(json, "5001");
    }

    #[test]
    fn test_deserialize() {
        let code: ErrorCode = serde_json::from_str("7002").unwrap();
        assert_eq!(code, ErrorCode::InvoiceAlreadyPaid);
    }

    #[test]
    fn test_deserialize_invalid() {
        let result: Result<ErrorCode, _> = serde_json::from_str("12345");
        assert!(result.is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(ErrorCode::Success.to_string(), "E0000");
        assert_eq!(ErrorCode::NotFound.to_string(), "E0003");
        assert_eq!(ErrorCode::DepositNotPaid.to_string(), "E5001");
    }

    #[test]
    fn test_message() {
        assert_eq!(ErrorCode::DepositNotPaid.message(), "Deposit must be settled first");
        assert_eq!(ErrorCode::EstimateNotFound.message(), "Estimate not found");
    }
}
