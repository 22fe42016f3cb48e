//! Invoice endpoints

use axum::Json;
use axum::extract::{Path, Query, State};
use http::StatusCode;
use shared::error::AppError;
use shared::models::{
    Invoice, InvoiceCreate, InvoiceDetail, InvoiceStatus, InvoiceUpdate, ListQuery,
    PaginatedResponse,
};

use super::ApiResult;
use crate::services::invoices;
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<PaginatedResponse<Invoice>> {
    Ok(Json(invoices::list(&state.pool, &query).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<InvoiceCreate>,
) -> ApiResult<InvoiceDetail> {
    Ok(Json(invoices::create(&state.pool, req).await?))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<InvoiceDetail> {
    Ok(Json(invoices::get(&state.pool, id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<InvoiceUpdate>,
) -> ApiResult<InvoiceDetail> {
    Ok(Json(invoices::update(&state.pool, id, req).await?))
}

/// DELETE /api/invoices/{id}, refused once paid
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    invoices::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn send(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Invoice> {
    Ok(Json(invoices::change_status(&state.pool, id, InvoiceStatus::Sent).await?))
}

pub async fn mark_paid(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Invoice> {
    Ok(Json(invoices::change_status(&state.pool, id, InvoiceStatus::Paid).await?))
}

pub async fn mark_overdue(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Invoice> {
    Ok(Json(invoices::change_status(&state.pool, id, InvoiceStatus::Overdue).await?))
}

pub async fn cancel(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Invoice> {
    Ok(Json(invoices::change_status(&state.pool, id, InvoiceStatus::Cancelled).await?))
}
