//! Unified error system for the billing service
//!
//! - [`ErrorCode`]: Standardized error codes for all error types
//! - [`ErrorCategory`]: Domain area of an error, derived from the code range
//! - [`ErrorClass`]: Failure kind (validation, conflict, upstream, ...), drives the HTTP status
//! - [`AppError`]: Rich error type with codes, messages, and details
//! - [`ApiResponse`]: Unified API response format
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorClass, ErrorCode, ApiResponse};
//!
//! let err = AppError::new(ErrorCode::DepositNotPaid);
//! assert_eq!(err.class(), ErrorClass::Precondition);
//!
//! let err = AppError::validation("Quantity must be at least 1")
//!     .with_detail("field", "quantity");
//!
//! let response = ApiResponse::<()>::error(&err);
//! assert_eq!(response.code, Some(2));
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::{ErrorCategory, ErrorClass};
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{ApiResponse, AppError, AppResult};
