//! Split payment endpoints

use axum::Json;
use axum::extract::{Path, State};
use shared::models::{InvoiceRecord, SplitKind, SplitPaymentRequest, SplitPaymentResponse};

use super::ApiResult;
use crate::services::split_payment;
use crate::state::AppState;

/// POST /api/payments/deposit
pub async fn deposit(
    State(state): State<AppState>,
    Json(req): Json<SplitPaymentRequest>,
) -> ApiResult<SplitPaymentResponse> {
    let resp = split_payment::request(&state, req.estimate_id, SplitKind::Deposit).await?;
    Ok(Json(resp))
}

/// POST /api/payments/balance
pub async fn balance(
    State(state): State<AppState>,
    Json(req): Json<SplitPaymentRequest>,
) -> ApiResult<SplitPaymentResponse> {
    let resp = split_payment::request(&state, req.estimate_id, SplitKind::Balance).await?;
    Ok(Json(resp))
}

/// GET /api/estimates/{id}/payments
pub async fn ledger(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Vec<InvoiceRecord>> {
    Ok(Json(split_payment::ledger(&state, id).await?))
}
