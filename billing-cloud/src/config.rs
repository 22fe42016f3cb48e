//! Billing server configuration

use crate::BoxError;

/// Billing server configuration, loaded once at startup and read-only after.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite connection URL (`sqlite:billing.db`)
    pub database_url: String,
    /// HTTP port
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// Stripe secret key (platform account)
    pub stripe_secret_key: String,
    /// Stripe webhook signing secret
    pub stripe_webhook_secret: String,
    /// Stripe REST base URL (overridable for stripe-mock)
    pub stripe_api_base: String,
    /// Timeout per Stripe request, seconds
    pub stripe_timeout_secs: u64,
    /// Public base URL used to build customer-facing links
    pub public_base_url: String,
    /// ISO currency code for remote invoice items
    pub currency: String,
}

impl Config {
    /// Require a secret env var: must be set and non-empty in non-development environments.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let public_base_url = match std::env::var("PUBLIC_BASE_URL") {
            Ok(url) => url.trim_end_matches('/').to_string(),
            Err(_) if environment == "development" => "http://localhost:8080".into(),
            Err(_) => return Err(format!("PUBLIC_BASE_URL must be set in {environment} environment").into()),
        };

        Ok(Self {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:billing.db".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            environment: environment.clone(),
            stripe_secret_key: Self::require_secret("STRIPE_SECRET_KEY", &environment)?,
            stripe_webhook_secret: Self::require_secret("STRIPE_WEBHOOK_SECRET", &environment)?,
            stripe_api_base: std::env::var("STRIPE_API_BASE")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "https://api.stripe.com".into()),
            stripe_timeout_secs: std::env::var("STRIPE_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            public_base_url,
            currency: std::env::var("CURRENCY")
                .map(|c| c.to_lowercase())
                .unwrap_or_else(|_| "brl".into()),
        })
    }
}
