//! Stripe integration via REST API (no SDK dependency)
//!
//! [`PaymentProvider`] is the seam the split-payment orchestrator calls;
//! [`StripeClient`] is the production implementation. All calls act on the
//! organization's connected account (`Stripe-Account` header) and carry an
//! idempotency key so a retried request returns the same remote object.

mod client;

pub use client::StripeClient;

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

/// Signed webhook timestamps older than this are rejected (seconds)
pub const WEBHOOK_TOLERANCE_SECS: i64 = 300;

/// Days the customer has to pay a split invoice
pub const INVOICE_DAYS_UNTIL_DUE: u32 = 7;

/// Payment provider failure
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("provider returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("unexpected provider response: {0}")]
    MalformedResponse(String),
}

impl ProviderError {
    /// Timeouts, connection failures, rate limits and 5xx are worth one retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            Self::MalformedResponse(_) => false,
        }
    }
}

pub struct CreateCustomer<'a> {
    pub account_id: &'a str,
    pub name: &'a str,
    pub email: Option<&'a str>,
    pub idempotency_key: &'a str,
}

pub struct CreateInvoice<'a> {
    pub account_id: &'a str,
    pub customer_id: &'a str,
    pub days_until_due: u32,
    /// Local ledger entry, echoed back in webhook payloads
    pub record_id: i64,
    pub estimate_id: i64,
    pub idempotency_key: &'a str,
}

pub struct AddInvoiceItem<'a> {
    pub account_id: &'a str,
    pub customer_id: &'a str,
    pub invoice_id: &'a str,
    pub amount_cents: i64,
    pub currency: &'a str,
    pub description: &'a str,
    pub idempotency_key: &'a str,
}

/// A finalized remote invoice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizedInvoice {
    pub id: String,
    pub hosted_url: String,
}

#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Create a customer on the connected account, returning its id.
    async fn create_customer(&self, req: CreateCustomer<'_>) -> Result<String, ProviderError>;

    /// Create a draft invoice (`send_invoice` collection), returning its id.
    async fn create_draft_invoice(&self, req: CreateInvoice<'_>) -> Result<String, ProviderError>;

    /// Attach a single line item to a draft invoice, returning the item id.
    async fn add_invoice_item(&self, req: AddInvoiceItem<'_>) -> Result<String, ProviderError>;

    /// Finalize a draft invoice so it gets a hosted payment page.
    async fn finalize_invoice(
        &self,
        account_id: &str,
        invoice_id: &str,
        idempotency_key: &str,
    ) -> Result<FinalizedInvoice, ProviderError>;
}

/// Webhook signature rejection reason
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("Invalid Stripe-Signature header")]
    MalformedHeader,
    #[error("Webhook signature mismatch")]
    Mismatch,
    #[error("Webhook timestamp too old")]
    Expired,
}

/// Verify Stripe webhook signature (HMAC-SHA256)
pub fn verify_webhook_signature(
    payload: &[u8],
    sig_header: &str,
    secret: &str,
) -> Result<(), SignatureError> {
    verify_webhook_signature_at(payload, sig_header, secret, chrono::Utc::now().timestamp())
}

/// Same as [`verify_webhook_signature`] against an explicit clock (Unix seconds).
pub fn verify_webhook_signature_at(
    payload: &[u8],
    sig_header: &str,
    secret: &str,
    now: i64,
) -> Result<(), SignatureError> {
    let mut timestamp = "";
    let mut signatures = Vec::new();
    for part in sig_header.split(',') {
        let part = part.trim();
        if let Some(t) = part.strip_prefix("t=") {
            timestamp = t;
        } else if let Some(v) = part.strip_prefix("v1=") {
            signatures.push(v);
        }
    }

    if timestamp.is_empty() || signatures.is_empty() {
        return Err(SignatureError::MalformedHeader);
    }

    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret.as_bytes()).map_err(|_| SignatureError::Mismatch)?;
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(payload);

    // A secret rotation can put several v1 entries in one header
    let matched = signatures.iter().any(|sig| {
        hex::decode(sig)
            .map(|bytes| mac.clone().verify_slice(&bytes).is_ok())
            .unwrap_or(false)
    });
    if !matched {
        return Err(SignatureError::Mismatch);
    }

    let ts: i64 = timestamp
        .parse()
        .map_err(|_| SignatureError::MalformedHeader)?;
    if (now - ts).abs() > WEBHOOK_TOLERANCE_SECS {
        return Err(SignatureError::Expired);
    }

    Ok(())
}
