//! Fee Routes
//!
//! - GET /api/v1/fees - The student's fee records and summary
//! - POST /api/v1/fees/pay - Record a payment against one record
//!
//! Payment is a placeholder: no gateway is contacted, the amount is credited
//! to the record.

use axum::{extract::State, Json};
use chrono::Utc;
use std::sync::Arc;

use crate::analytics::fees::summarize;
use crate::api::dto::{FeesResponse, PaymentRequest};
use crate::api::error::ApiResult;
use crate::api::extract::CurrentUser;
use crate::api::state::AppState;
use crate::domain::Role;

/// GET /api/v1/fees
pub async fn my_fees(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
) -> ApiResult<Json<FeesResponse>> {
    current.require(&[Role::Student])?;
    Ok(Json(fees_response(&state, current.id()).await))
}

/// POST /api/v1/fees/pay
pub async fn pay(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Json(req): Json<PaymentRequest>,
) -> ApiResult<Json<FeesResponse>> {
    current.require(&[Role::Student])?;
    state
        .store
        .record_payment(current.id(), req.fee_id, req.amount)
        .await?;
    Ok(Json(fees_response(&state, current.id()).await))
}

async fn fees_response(state: &AppState, student_id: &str) -> FeesResponse {
    let records = state.store.fees_for(student_id).await;
    let summary = summarize(&records, Utc::now().date_naive());
    FeesResponse { records, summary }
}
