//! API routes for billing-cloud

pub mod customers;
pub mod estimates;
pub mod health;
pub mod invoices;
pub mod items;
pub mod organizations;
pub mod payments;
pub mod stripe_webhook;

use axum::routing::{get, post};
use axum::{Json, Router};
use shared::error::AppError;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub(crate) type ApiResult<T> = Result<Json<T>, AppError>;

/// Create the combined router
pub fn create_router(state: AppState) -> Router {
    let organizations = Router::new()
        .route("/api/organizations", post(organizations::create))
        .route("/api/organizations/{id}", get(organizations::get))
        .route(
            "/api/organizations/{id}/payment-account",
            post(organizations::link_payment_account),
        )
        .route(
            "/api/organizations/{id}/contract-template",
            get(organizations::get_contract_template).put(organizations::set_contract_template),
        );

    let catalog = Router::new()
        .route(
            "/api/customers",
            get(customers::list).post(customers::create),
        )
        .route(
            "/api/customers/{id}",
            get(customers::get)
                .put(customers::update)
                .delete(customers::delete),
        )
        .route("/api/items", get(items::list).post(items::create))
        .route(
            "/api/items/{id}",
            get(items::get).put(items::update).delete(items::delete),
        );

    let estimates = Router::new()
        .route(
            "/api/estimates",
            get(estimates::list).post(estimates::create),
        )
        .route(
            "/api/estimates/{id}",
            get(estimates::get)
                .put(estimates::update)
                .delete(estimates::delete),
        )
        .route("/api/estimates/{id}/send", post(estimates::send))
        .route("/api/estimates/{id}/accept", post(estimates::accept))
        .route("/api/estimates/{id}/cancel", post(estimates::cancel))
        .route("/api/estimates/{id}/payments", get(payments::ledger));

    let invoices = Router::new()
        .route("/api/invoices", get(invoices::list).post(invoices::create))
        .route(
            "/api/invoices/{id}",
            get(invoices::get)
                .put(invoices::update)
                .delete(invoices::delete),
        )
        .route("/api/invoices/{id}/send", post(invoices::send))
        .route("/api/invoices/{id}/paid", post(invoices::mark_paid))
        .route("/api/invoices/{id}/overdue", post(invoices::mark_overdue))
        .route("/api/invoices/{id}/cancel", post(invoices::cancel));

    let payments = Router::new()
        .route("/api/payments/deposit", post(payments::deposit))
        .route("/api/payments/balance", post(payments::balance));

    // Stripe webhook (signature-verified, raw body)
    let webhook = Router::new().route("/stripe/webhook", post(stripe_webhook::handle_webhook));

    Router::new()
        .route("/health", get(health::health_check))
        .merge(organizations)
        .merge(catalog)
        .merge(estimates)
        .merge(invoices)
        .merge(payments)
        .merge(webhook)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
