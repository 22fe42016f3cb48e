//! Application state for billing-cloud

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::BoxError;
use crate::config::Config;
use crate::db::DbService;
use crate::stripe::{PaymentProvider, StripeClient};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// SQLite connection pool
    pub pool: SqlitePool,
    /// Payment provider (Stripe in production)
    pub payments: Arc<dyn PaymentProvider>,
    /// Stripe webhook signing secret
    pub stripe_webhook_secret: String,
    /// Base URL for customer-facing links
    pub public_base_url: String,
    /// Currency of remote invoice items
    pub currency: String,
}

impl AppState {
    /// Open the database, run migrations and build the Stripe client
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let db = DbService::new(&config.database_url).await?;
        let stripe = StripeClient::new(
            &config.stripe_api_base,
            &config.stripe_secret_key,
            config.stripe_timeout_secs,
        )?;
        Ok(Self::with_provider(db.pool, Arc::new(stripe), config))
    }

    /// Assemble state around an existing pool and provider
    pub fn with_provider(
        pool: SqlitePool,
        payments: Arc<dyn PaymentProvider>,
        config: &Config,
    ) -> Self {
        Self {
            pool,
            payments,
            stripe_webhook_secret: config.stripe_webhook_secret.clone(),
            public_base_url: config.public_base_url.clone(),
            currency: config.currency.clone(),
        }
    }

    /// Customer-facing link to an estimate
    pub fn estimate_url(&self, estimate_id: i64) -> String {
        format!("{}/estimate/{estimate_id}", self.public_base_url)
    }
}
