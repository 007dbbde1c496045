//! Exam & Grade Routes
//!
//! - GET /api/v1/grades - The student's exam results and course summaries
//! - GET /api/v1/exams?course= - Exams, optionally for one course
//! - POST /api/v1/exams - Create an exam (faculty, admin)
//! - PUT /api/v1/grades - Record or overwrite a grade (faculty, admin)
//! - GET /api/v1/exams/:id/stats - Statistics for one exam (faculty, admin)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::analytics::grades::{course_summaries, exam_results, exam_statistics};
use crate::analytics::ExamStatistics;
use crate::api::dto::{CourseFilter, GradesResponse, RecordGradeRequest};
use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::CurrentUser;
use crate::api::state::AppState;
use crate::domain::{Exam, Grade, NewExam, Role};

/// GET /api/v1/grades
pub async fn my_grades(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
) -> ApiResult<Json<GradesResponse>> {
    current.require(&[Role::Student])?;

    let exams = state.store.exams(None).await;
    let grades = state.store.grades_for_student(current.id()).await;
    let results = exam_results(&exams, &grades);
    let courses = course_summaries(&results, &state.config.policy);

    Ok(Json(GradesResponse { results, courses }))
}

/// GET /api/v1/exams
pub async fn list_exams(
    State(state): State<Arc<AppState>>,
    _current: CurrentUser,
    Query(filter): Query<CourseFilter>,
) -> Json<Vec<Exam>> {
    Json(state.store.exams(filter.course.as_deref()).await)
}

/// POST /api/v1/exams
pub async fn create_exam(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Json(req): Json<NewExam>,
) -> ApiResult<(StatusCode, Json<Exam>)> {
    current.require(&[Role::Faculty, Role::Admin])?;
    let exam = state.store.create_exam(req).await?;
    Ok((StatusCode::CREATED, Json(exam)))
}

/// PUT /api/v1/grades
pub async fn record_grade(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Json(req): Json<RecordGradeRequest>,
) -> ApiResult<Json<Grade>> {
    current.require(&[Role::Faculty, Role::Admin])?;
    let grade = state
        .store
        .record_grade(&req.student_id, req.exam_id, req.score, &req.feedback)
        .await?;
    tracing::info!(
        exam_id = req.exam_id,
        student_id = %req.student_id,
        graded_by = %current.id(),
        "Recorded grade"
    );
    Ok(Json(grade))
}

/// GET /api/v1/exams/:id/stats
pub async fn exam_stats(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(id): Path<u64>,
) -> ApiResult<Json<ExamStatistics>> {
    current.require(&[Role::Faculty, Role::Admin])?;
    let exam = state
        .store
        .exam(id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Exam {} not found", id)))?;
    let grades = state.store.grades_for_exam(id).await;
    Ok(Json(exam_statistics(&exam, &grades)))
}
