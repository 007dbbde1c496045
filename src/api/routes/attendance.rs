//! Attendance Routes
//!
//! - GET /api/v1/attendance?course= - The student's own records and summary
//! - GET /api/v1/attendance/summary - The student's per-course breakdown
//! - POST /api/v1/attendance - Mark one session (faculty, admin)
//! - GET /api/v1/attendance/course/:code - Roster attendance (faculty, admin)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::analytics::{self, attendance::summarize};
use crate::api::dto::{
    AttendanceResponse, AttendanceSummaryResponse, CourseAttendanceResponse, CourseFilter,
    StudentAttendance,
};
use crate::api::error::ApiResult;
use crate::api::extract::CurrentUser;
use crate::api::state::AppState;
use crate::domain::{AttendanceRecord, NewAttendance, Role};

/// GET /api/v1/attendance
pub async fn my_attendance(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Query(filter): Query<CourseFilter>,
) -> ApiResult<Json<AttendanceResponse>> {
    current.require(&[Role::Student])?;

    let records = state
        .store
        .attendance_for(current.id(), filter.course.as_deref())
        .await;
    let summary = summarize(records.iter().map(|r| r.status), &state.config.policy);

    Ok(Json(AttendanceResponse { records, summary }))
}

/// GET /api/v1/attendance/summary
pub async fn my_summary(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
) -> ApiResult<Json<AttendanceSummaryResponse>> {
    current.require(&[Role::Student])?;

    let records = state.store.attendance_for(current.id(), None).await;
    let breakdown = analytics::by_course(&records, &state.config.policy);

    Ok(Json(AttendanceSummaryResponse {
        threshold: state.config.policy.threshold,
        overall: breakdown.overall,
        courses: breakdown.courses,
    }))
}

/// POST /api/v1/attendance
///
/// Marking the same student, course, date and start time again overwrites
/// the earlier record.
pub async fn mark_attendance(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Json(req): Json<NewAttendance>,
) -> ApiResult<(StatusCode, Json<AttendanceRecord>)> {
    current.require(&[Role::Faculty, Role::Admin])?;
    let record = state.store.mark_attendance(req).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /api/v1/attendance/course/:code
pub async fn course_attendance(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(code): Path<String>,
) -> ApiResult<Json<CourseAttendanceResponse>> {
    current.require(&[Role::Faculty, Role::Admin])?;

    let records = state.store.course_attendance(&code).await?;
    let roster = state.store.roster(&code).await?;

    let students = roster
        .into_iter()
        .map(|student| {
            let statuses = records
                .iter()
                .filter(|r| r.student_id == student.id)
                .map(|r| r.status);
            StudentAttendance {
                summary: summarize(statuses, &state.config.policy),
                student_id: student.id,
                name: student.name,
            }
        })
        .collect();

    Ok(Json(CourseAttendanceResponse {
        course_code: code.to_uppercase(),
        students,
        records,
    }))
}
