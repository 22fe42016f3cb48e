//! Customer endpoints

use axum::Json;
use axum::extract::{Path, Query, State};
use http::StatusCode;
use shared::error::AppError;
use shared::models::{Customer, CustomerCreate, CustomerUpdate, ListQuery, PaginatedResponse};

use super::ApiResult;
use crate::services::customers;
use crate::state::AppState;

/// GET /api/customers?org_id=&search=&page=&limit=
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<PaginatedResponse<Customer>> {
    Ok(Json(customers::list(&state.pool, &query).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CustomerCreate>,
) -> ApiResult<Customer> {
    Ok(Json(customers::create(&state.pool, req).await?))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Customer> {
    Ok(Json(customers::get(&state.pool, id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<CustomerUpdate>,
) -> ApiResult<Customer> {
    Ok(Json(customers::update(&state.pool, id, req).await?))
}

/// DELETE /api/customers/{id}, refused while estimates or invoices exist
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    customers::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
