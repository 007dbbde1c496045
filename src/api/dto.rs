//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! Domain records that already have the right shape (courses, exams,
//! announcements, ...) are sent as-is; the types here cover the rest.

use serde::{Deserialize, Serialize};

use crate::analytics::{AttendanceSummary, CourseAttendance, CourseGradeSummary, ExamResult, FeeSummary};
use crate::domain::{AttendanceRecord, Course, FacultyMember, FeeRecord, User};
use crate::session::{Session, Theme};

// ============================================
// AUTH DTOs
// ============================================

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Issued token plus the signed-in user
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

impl From<Session> for AuthResponse {
    fn from(session: Session) -> Self {
        Self {
            token: session.token,
            user: session.user,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ThemeDto {
    pub theme: Theme,
}

// ============================================
// LIST DTOs
// ============================================

/// Query string shared by every paginated list
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub search: Option<String>,
    /// Category tab; "all" or absent disables it
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub per_page: Option<usize>,
}

/// Optional `?course=` filter
#[derive(Debug, Default, Deserialize)]
pub struct CourseFilter {
    #[serde(default)]
    pub course: Option<String>,
}

/// Required `?course=` parameter
#[derive(Debug, Deserialize)]
pub struct CourseParam {
    pub course: String,
}

// ============================================
// COURSE DTOs
// ============================================

#[derive(Debug, Serialize)]
pub struct CourseDetail {
    #[serde(flatten)]
    pub course: Course,
    pub enrolled_students: usize,
}

// ============================================
// ATTENDANCE DTOs
// ============================================

#[derive(Debug, Serialize)]
pub struct AttendanceResponse {
    pub records: Vec<AttendanceRecord>,
    pub summary: AttendanceSummary,
}

#[derive(Debug, Serialize)]
pub struct AttendanceSummaryResponse {
    pub threshold: u32,
    pub overall: AttendanceSummary,
    pub courses: Vec<CourseAttendance>,
}

/// One student's line in a course roster view
#[derive(Debug, Serialize)]
pub struct StudentAttendance {
    pub student_id: String,
    pub name: String,
    pub summary: AttendanceSummary,
}

#[derive(Debug, Serialize)]
pub struct CourseAttendanceResponse {
    pub course_code: String,
    pub students: Vec<StudentAttendance>,
    pub records: Vec<AttendanceRecord>,
}

// ============================================
// GRADE DTOs
// ============================================

#[derive(Debug, Serialize)]
pub struct GradesResponse {
    pub results: Vec<ExamResult>,
    pub courses: Vec<CourseGradeSummary>,
}

#[derive(Debug, Deserialize)]
pub struct RecordGradeRequest {
    pub student_id: String,
    pub exam_id: u64,
    pub score: f64,
    #[serde(default)]
    pub feedback: String,
}

// ============================================
// FEE DTOs
// ============================================

#[derive(Debug, Serialize)]
pub struct FeesResponse {
    pub records: Vec<FeeRecord>,
    pub summary: FeeSummary,
}

#[derive(Debug, Deserialize)]
pub struct PaymentRequest {
    pub fee_id: u64,
    pub amount: f64,
}

// ============================================
// DIRECTORY DTOs
// ============================================

#[derive(Debug, Deserialize)]
pub struct CreateFacultyRequest {
    pub name: String,
    pub email: String,
    pub department: String,
    pub designation: String,
    #[serde(default)]
    pub courses: Vec<String>,
}

impl From<CreateFacultyRequest> for FacultyMember {
    fn from(req: CreateFacultyRequest) -> Self {
        FacultyMember {
            id: String::new(),
            name: req.name,
            email: req.email,
            department: req.department,
            designation: req.designation,
            courses: req.courses,
        }
    }
}

// ============================================
// ASSISTANT DTOs
// ============================================

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    /// Which profile backend is in use: "hosted" or "local"
    pub profiles: String,
    pub active_sessions: usize,
    pub uptime_seconds: u64,
    pub version: String,
}
