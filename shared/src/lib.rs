//! Shared types for the billing service
//!
//! Error codes and the API response envelope, domain models with their
//! status lifecycles, integer-cents money arithmetic, and document
//! numbering. No I/O lives here.

pub mod error;
pub mod models;
pub mod money;
pub mod numbering;
pub mod util;

// Re-exports
pub use axum::{Json, body};
pub use http;
pub use serde::{Deserialize, Serialize};
