//! Organization onboarding endpoints

use axum::Json;
use axum::extract::{Path, State};
use shared::models::{
    ContractTemplate, ContractTemplateCreate, Organization, OrganizationCreate, PaymentAccountLink,
};

use super::ApiResult;
use crate::services::organizations;
use crate::state::AppState;

/// POST /api/organizations
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<OrganizationCreate>,
) -> ApiResult<Organization> {
    Ok(Json(organizations::create(&state.pool, req).await?))
}

/// GET /api/organizations/{id}
pub async fn get(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Organization> {
    Ok(Json(organizations::get(&state.pool, id).await?))
}

/// POST /api/organizations/{id}/payment-account
pub async fn link_payment_account(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<PaymentAccountLink>,
) -> ApiResult<Organization> {
    let org =
        organizations::link_payment_account(&state.pool, id, &req.stripe_account_id).await?;
    Ok(Json(org))
}

/// GET /api/organizations/{id}/contract-template
pub async fn get_contract_template(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<ContractTemplate> {
    Ok(Json(organizations::active_contract_template(&state.pool, id).await?))
}

/// PUT /api/organizations/{id}/contract-template
pub async fn set_contract_template(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<ContractTemplateCreate>,
) -> ApiResult<ContractTemplate> {
    Ok(Json(organizations::set_contract_template(&state.pool, id, req).await?))
}
