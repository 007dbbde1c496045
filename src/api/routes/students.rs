//! Student Directory Routes
//!
//! Backed by the profile source, which is either the hosted profile table
//! or the local fallback.
//!
//! - GET /api/v1/students - Paginated profiles (search, program tab)
//! - DELETE /api/v1/students/:id - Delete a profile (admin)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::analytics::Page;
use crate::api::dto::ListParams;
use crate::api::error::ApiResult;
use crate::api::extract::CurrentUser;
use crate::api::state::AppState;
use crate::domain::{Role, StudentProfile};

/// GET /api/v1/students
pub async fn list_students(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Page<StudentProfile>>> {
    current.require(&[Role::Faculty, Role::Admin])?;
    let profiles = state.profiles.list().await.map_err(|e| {
        tracing::warn!(backend = state.profiles.backend(), error = %e, "Failed to list student profiles");
        e
    })?;
    Ok(Json(state.list_query(params).apply(&profiles)))
}

/// DELETE /api/v1/students/:id
pub async fn delete_student(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    current.require(&[Role::Admin])?;
    state.profiles.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
