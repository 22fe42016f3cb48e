//! Item catalog endpoints

use axum::Json;
use axum::extract::{Path, Query, State};
use http::StatusCode;
use shared::error::AppError;
use shared::models::{Item, ItemCreate, ItemUpdate, ListQuery, PaginatedResponse};

use super::ApiResult;
use crate::services::items;
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<PaginatedResponse<Item>> {
    Ok(Json(items::list(&state.pool, &query).await?))
}

pub async fn create(State(state): State<AppState>, Json(req): Json<ItemCreate>) -> ApiResult<Item> {
    Ok(Json(items::create(&state.pool, req).await?))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Item> {
    Ok(Json(items::get(&state.pool, id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<ItemUpdate>,
) -> ApiResult<Item> {
    Ok(Json(items::update(&state.pool, id, req).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    items::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
