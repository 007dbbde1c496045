//! Faculty Directory Routes
//!
//! - GET /api/v1/faculty - Paginated directory (search, department tab)
//! - POST /api/v1/faculty - Add a member (admin)
//! - DELETE /api/v1/faculty/:id - Remove a member (admin)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::analytics::Page;
use crate::api::dto::{CreateFacultyRequest, ListParams};
use crate::api::error::ApiResult;
use crate::api::extract::CurrentUser;
use crate::api::state::AppState;
use crate::domain::{FacultyMember, Role};

/// GET /api/v1/faculty
pub async fn list_faculty(
    State(state): State<Arc<AppState>>,
    _current: CurrentUser,
    Query(params): Query<ListParams>,
) -> Json<Page<FacultyMember>> {
    let members = state.store.faculty().await;
    Json(state.list_query(params).apply(&members))
}

/// POST /api/v1/faculty
pub async fn create_faculty(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Json(req): Json<CreateFacultyRequest>,
) -> ApiResult<(StatusCode, Json<FacultyMember>)> {
    current.require(&[Role::Admin])?;
    let member = state.store.create_faculty(req.into()).await?;
    Ok((StatusCode::CREATED, Json(member)))
}

/// DELETE /api/v1/faculty/:id
pub async fn delete_faculty(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    current.require(&[Role::Admin])?;
    state.store.delete_faculty(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
