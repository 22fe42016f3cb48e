//! reqwest-backed [`PaymentProvider`]

use std::time::Duration;

use async_trait::async_trait;

use super::{
    AddInvoiceItem, CreateCustomer, CreateInvoice, FinalizedInvoice, PaymentProvider,
    ProviderError,
};

/// Stripe REST client acting on connected accounts
#[derive(Clone)]
pub struct StripeClient {
    http: reqwest::Client,
    api_base: String,
    secret_key: String,
}

impl StripeClient {
    pub fn new(
        api_base: &str,
        secret_key: &str,
        timeout_secs: u64,
    ) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            secret_key: secret_key.to_string(),
        })
    }

    /// POST a form to `path` on behalf of `account_id`, retrying once on
    /// transient failures. The idempotency key makes the retry safe.
    async fn post_form(
        &self,
        path: &str,
        account_id: &str,
        idempotency_key: &str,
        form: &[(&str, String)],
    ) -> Result<serde_json::Value, ProviderError> {
        match self.post_once(path, account_id, idempotency_key, form).await {
            Err(e) if e.is_retryable() => {
                tracing::warn!(path, error = %e, "Stripe request failed, retrying once");
                self.post_once(path, account_id, idempotency_key, form).await
            }
            other => other,
        }
    }

    async fn post_once(
        &self,
        path: &str,
        account_id: &str,
        idempotency_key: &str,
        form: &[(&str, String)],
    ) -> Result<serde_json::Value, ProviderError> {
        let resp = self
            .http
            .post(format!("{}{path}", self.api_base))
            .basic_auth(&self.secret_key, None::<&str>)
            .header("Stripe-Account", account_id)
            .header("Idempotency-Key", idempotency_key)
            .form(form)
            .send()
            .await?;

        let status = resp.status();
        let body: serde_json::Value = resp.json().await?;
        if !status.is_success() {
            let message = body["error"]["message"]
                .as_str()
                .unwrap_or("unknown error")
                .to_string();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(body)
    }
}

fn str_field(body: &serde_json::Value, field: &str) -> Result<String, ProviderError> {
    body[field]
        .as_str()
        .map(String::from)
        .ok_or_else(|| ProviderError::MalformedResponse(format!("missing {field}: {body}")))
}

#[async_trait]
impl PaymentProvider for StripeClient {
    async fn create_customer(&self, req: CreateCustomer<'_>) -> Result<String, ProviderError> {
        let mut form = vec![("name", req.name.to_string())];
        if let Some(email) = req.email {
            form.push(("email", email.to_string()));
        }
        let body = self
            .post_form("/v1/customers", req.account_id, req.idempotency_key, &form)
            .await?;
        str_field(&body, "id")
    }

    async fn create_draft_invoice(&self, req: CreateInvoice<'_>) -> Result<String, ProviderError> {
        let form = [
            ("customer", req.customer_id.to_string()),
            ("collection_method", "send_invoice".to_string()),
            ("days_until_due", req.days_until_due.to_string()),
            ("auto_advance", "false".to_string()),
            ("metadata[invoice_record_id]", req.record_id.to_string()),
            ("metadata[estimate_id]", req.estimate_id.to_string()),
        ];
        let body = self
            .post_form("/v1/invoices", req.account_id, req.idempotency_key, &form)
            .await?;
        str_field(&body, "id")
    }

    async fn add_invoice_item(&self, req: AddInvoiceItem<'_>) -> Result<String, ProviderError> {
        let form = [
            ("customer", req.customer_id.to_string()),
            ("invoice", req.invoice_id.to_string()),
            ("amount", req.amount_cents.to_string()),
            ("currency", req.currency.to_string()),
            ("description", req.description.to_string()),
        ];
        let body = self
            .post_form("/v1/invoiceitems", req.account_id, req.idempotency_key, &form)
            .await?;
        str_field(&body, "id")
    }

    async fn finalize_invoice(
        &self,
        account_id: &str,
        invoice_id: &str,
        idempotency_key: &str,
    ) -> Result<FinalizedInvoice, ProviderError> {
        let body = self
            .post_form(
                &format!("/v1/invoices/{invoice_id}/finalize"),
                account_id,
                idempotency_key,
                &[],
            )
            .await?;
        Ok(FinalizedInvoice {
            id: str_field(&body, "id")?,
            hosted_url: str_field(&body, "hosted_invoice_url")?,
        })
    }
}
