//! Course Routes
//!
//! - GET /api/v1/courses - Paginated catalogue (search, department tab)
//! - GET /api/v1/courses/:code - One course with its enrollment count
//! - POST /api/v1/courses - Create a course (admin)
//! - DELETE /api/v1/courses/:code - Delete a course (admin)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::analytics::Page;
use crate::api::dto::{CourseDetail, ListParams};
use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::CurrentUser;
use crate::api::state::AppState;
use crate::domain::{Course, Role};

/// GET /api/v1/courses
pub async fn list_courses(
    State(state): State<Arc<AppState>>,
    _current: CurrentUser,
    Query(params): Query<ListParams>,
) -> Json<Page<Course>> {
    let courses = state.store.courses().await;
    Json(state.list_query(params).apply(&courses))
}

/// GET /api/v1/courses/:code
pub async fn get_course(
    State(state): State<Arc<AppState>>,
    _current: CurrentUser,
    Path(code): Path<String>,
) -> ApiResult<Json<CourseDetail>> {
    let course = state
        .store
        .course(&code)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Course {} not found", code)))?;
    let enrolled_students = state.store.roster(&course.code).await?.len();

    Ok(Json(CourseDetail {
        course,
        enrolled_students,
    }))
}

/// POST /api/v1/courses
pub async fn create_course(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Json(course): Json<Course>,
) -> ApiResult<(StatusCode, Json<Course>)> {
    current.require(&[Role::Admin])?;
    let created = state.store.create_course(course).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// DELETE /api/v1/courses/:code
pub async fn delete_course(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(code): Path<String>,
) -> ApiResult<StatusCode> {
    current.require(&[Role::Admin])?;
    state.store.delete_course(&code).await?;
    Ok(StatusCode::NO_CONTENT)
}
