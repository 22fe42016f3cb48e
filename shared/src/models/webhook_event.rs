//! Webhook Event Model

use serde::{Deserialize, Serialize};

/// Append-only record of a received provider event, keyed by the provider's
/// event id. `processed_at` is set only after the handler succeeded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct WebhookEvent {
    pub event_id: String,
    pub event_type: String,
    pub payload: String,
    pub received_at: i64,
    pub processed_at: Option<i64>,
}
