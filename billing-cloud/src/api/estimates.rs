//! Estimate endpoints

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use http::StatusCode;
use shared::error::AppError;
use shared::models::{
    Acceptance, Estimate, EstimateAccept, EstimateCreate, EstimateDetail, EstimateSent,
    EstimateUpdate, ListQuery, PaginatedResponse,
};

use super::ApiResult;
use crate::services::estimates;
use crate::state::AppState;

/// GET /api/estimates?org_id=&search=&page=&limit=
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<PaginatedResponse<Estimate>> {
    Ok(Json(estimates::list(&state.pool, &query).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<EstimateCreate>,
) -> ApiResult<EstimateDetail> {
    Ok(Json(estimates::create(&state.pool, req).await?))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<EstimateDetail> {
    Ok(Json(estimates::get(&state.pool, id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<EstimateUpdate>,
) -> ApiResult<EstimateDetail> {
    Ok(Json(estimates::update(&state.pool, id, req).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    estimates::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/estimates/{id}/send
pub async fn send(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<EstimateSent> {
    Ok(Json(estimates::send(&state, id).await?))
}

/// POST /api/estimates/{id}/accept
///
/// The signer's address is the first `x-forwarded-for` hop.
pub async fn accept(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(req): Json<EstimateAccept>,
) -> ApiResult<Acceptance> {
    let ip = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next());
    Ok(Json(estimates::accept(&state.pool, id, req, ip).await?))
}

pub async fn cancel(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Estimate> {
    Ok(Json(estimates::cancel(&state.pool, id).await?))
}
