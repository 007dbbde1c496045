//! Dashboard Route
//!
//! - GET /api/v1/dashboard - Overview for the signed-in user
//!
//! The body depends on the caller's role and is tagged with it:
//! `{"role": "student", ...}`, `{"role": "faculty", ...}` or
//! `{"role": "admin", ...}`.

use axum::{extract::State, Json};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;

use crate::analytics::attendance::summarize;
use crate::analytics::grades::{course_summaries, exam_results};
use crate::analytics::listing::newest_first;
use crate::analytics::{self, AttendanceSummary, CourseAttendance, CourseGradeSummary, FeeSummary};
use crate::api::error::ApiResult;
use crate::api::extract::CurrentUser;
use crate::api::state::AppState;
use crate::domain::{Announcement, Course, Role, User};

/// How many announcements a dashboard shows
const RECENT_ANNOUNCEMENTS: usize = 3;

#[derive(Debug, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Dashboard {
    Student(StudentDashboard),
    Faculty(FacultyDashboard),
    Admin(AdminDashboard),
}

#[derive(Debug, Serialize)]
pub struct StudentDashboard {
    pub user: User,
    pub enrolled_courses: Vec<Course>,
    pub total_credits: u32,
    pub attendance: AttendanceSummary,
    pub at_risk_courses: Vec<CourseAttendance>,
    pub grades: Vec<CourseGradeSummary>,
    pub fees: FeeSummary,
    pub recent_announcements: Vec<Announcement>,
}

#[derive(Debug, Serialize)]
pub struct TaughtCourse {
    pub course: Course,
    pub roster_size: usize,
    pub attendance: AttendanceSummary,
    /// Students below the attendance threshold in this course. Students
    /// with no recorded sessions yet are not listed.
    pub at_risk_students: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct FacultyDashboard {
    pub user: User,
    pub courses: Vec<TaughtCourse>,
    pub recent_announcements: Vec<Announcement>,
}

#[derive(Debug, Serialize)]
pub struct FeeTotals {
    pub billed: f64,
    pub collected: f64,
    pub outstanding: f64,
}

#[derive(Debug, Serialize)]
pub struct AdminDashboard {
    pub user: User,
    pub students: usize,
    pub faculty_accounts: usize,
    pub admins: usize,
    pub courses: usize,
    pub faculty_members: usize,
    pub announcements: usize,
    pub fees: FeeTotals,
}

/// GET /api/v1/dashboard
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
) -> ApiResult<Json<Dashboard>> {
    let dashboard = match current.user.role {
        Role::Student => Dashboard::Student(student_dashboard(&state, current.user).await?),
        Role::Faculty => Dashboard::Faculty(faculty_dashboard(&state, current.user).await?),
        Role::Admin => Dashboard::Admin(admin_dashboard(&state, current.user).await),
    };
    Ok(Json(dashboard))
}

async fn recent_announcements(state: &AppState, user: &User) -> Vec<Announcement> {
    let mut visible = state.store.announcements_for(user).await;
    visible.sort_by(newest_first);
    visible.truncate(RECENT_ANNOUNCEMENTS);
    visible
}

async fn student_dashboard(state: &AppState, user: User) -> ApiResult<StudentDashboard> {
    let policy = &state.config.policy;
    let view = state.store.enrollment_view(&user.id).await?;

    let records = state.store.attendance_for(&user.id, None).await;
    let breakdown = analytics::by_course(&records, policy);
    let at_risk_courses = breakdown.at_risk().cloned().collect();

    let exams = state.store.exams(None).await;
    let grades = state.store.grades_for_student(&user.id).await;
    let grade_summaries = course_summaries(&exam_results(&exams, &grades), policy);

    let fees = analytics::fees::summarize(
        &state.store.fees_for(&user.id).await,
        Utc::now().date_naive(),
    );

    Ok(StudentDashboard {
        recent_announcements: recent_announcements(state, &user).await,
        user,
        enrolled_courses: view.enrolled,
        total_credits: view.total_credits,
        attendance: breakdown.overall,
        at_risk_courses,
        grades: grade_summaries,
        fees,
    })
}

async fn faculty_dashboard(state: &AppState, user: User) -> ApiResult<FacultyDashboard> {
    let policy = &state.config.policy;
    let mut courses = Vec::new();

    for course in state.store.courses_taught_by(&user.name).await {
        let roster = state.store.roster(&course.code).await?;
        let records = state.store.course_attendance(&course.code).await?;

        let at_risk_students = roster
            .iter()
            .filter(|student| {
                let statuses = records
                    .iter()
                    .filter(|r| r.student_id == student.id)
                    .map(|r| r.status);
                let summary = summarize(statuses, policy);
                summary.total > 0 && summary.standing.is_at_risk()
            })
            .map(|student| student.id.clone())
            .collect();

        courses.push(TaughtCourse {
            attendance: summarize(records.iter().map(|r| r.status), policy),
            roster_size: roster.len(),
            at_risk_students,
            course,
        });
    }

    Ok(FacultyDashboard {
        recent_announcements: recent_announcements(state, &user).await,
        user,
        courses,
    })
}

async fn admin_dashboard(state: &AppState, user: User) -> AdminDashboard {
    let fees = state.store.all_fees().await;
    let billed: f64 = fees.iter().map(|f| f.amount()).sum();
    let collected: f64 = fees.iter().map(|f| f.paid).sum();

    AdminDashboard {
        user,
        students: state.store.count_by_role(Role::Student).await,
        faculty_accounts: state.store.count_by_role(Role::Faculty).await,
        admins: state.store.count_by_role(Role::Admin).await,
        courses: state.store.courses().await.len(),
        faculty_members: state.store.faculty().await.len(),
        announcements: state.store.announcement_count().await,
        fees: FeeTotals {
            billed,
            collected,
            outstanding: fees.iter().map(|f| f.pending()).sum(),
        },
    }
}
