//! Stripe webhook handler
//!
//! POST /stripe/webhook: raw body, verified against `Stripe-Signature`.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use serde_json::{Value, json};

use super::ApiResult;
use crate::services::webhook::{self, WebhookOutcome};
use crate::state::AppState;

/// Must receive the raw body (not JSON) for HMAC verification.
pub async fn handle_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Value> {
    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok());

    let outcome = webhook::handle(&state, &body, signature).await?;
    Ok(Json(json!({
        "received": true,
        "duplicate": outcome == WebhookOutcome::Duplicate,
    })))
}
