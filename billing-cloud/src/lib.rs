//! billing-cloud: estimates, invoices and split payments
//!
//! Long-running service that:
//! - Manages customers, catalog items, estimates and invoices per organization
//! - Numbers documents per organization (`EST-001`, `INV-001`)
//! - Collects estimate payments as a 50% deposit and a 50% balance invoice
//!   on the organization's connected Stripe account
//! - Reconciles payment state from signed Stripe webhooks

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod services;
pub mod state;
pub mod stripe;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[cfg(test)]
pub(crate) mod test_support;
