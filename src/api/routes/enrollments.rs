//! Enrollment Routes
//!
//! A student's enrollment is their split of the catalogue into enrolled and
//! available courses; enrolling and dropping move a course between the two.
//!
//! - GET /api/v1/enrollments
//! - POST /api/v1/enrollments/:code
//! - DELETE /api/v1/enrollments/:code

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::api::error::ApiResult;
use crate::api::extract::CurrentUser;
use crate::api::state::AppState;
use crate::domain::{EnrollmentView, Role};

/// GET /api/v1/enrollments
pub async fn get_enrollments(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
) -> ApiResult<Json<EnrollmentView>> {
    current.require(&[Role::Student])?;
    Ok(Json(state.store.enrollment_view(current.id()).await?))
}

/// POST /api/v1/enrollments/:code
pub async fn enroll(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(code): Path<String>,
) -> ApiResult<Json<EnrollmentView>> {
    current.require(&[Role::Student])?;
    Ok(Json(state.store.enroll(current.id(), &code).await?))
}

/// DELETE /api/v1/enrollments/:code
pub async fn drop_course(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(code): Path<String>,
) -> ApiResult<Json<EnrollmentView>> {
    current.require(&[Role::Student])?;
    Ok(Json(state.store.drop_course(current.id(), &code).await?))
}
