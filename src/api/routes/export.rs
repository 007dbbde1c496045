//! Export Routes
//!
//! CSV downloads of one course's gradebook and attendance register.
//!
//! - GET /api/v1/export/grades?course= (faculty, admin)
//! - GET /api/v1/export/attendance?course= (faculty, admin)

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::analytics::{percentage, LetterGrade};
use crate::api::dto::CourseParam;
use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::CurrentUser;
use crate::api::state::AppState;
use crate::domain::{AttendanceRecord, Exam, Grade, Role, User};

#[derive(Debug, Serialize)]
struct GradeRow<'a> {
    student_id: &'a str,
    student_name: &'a str,
    exam: &'a str,
    exam_date: String,
    score: f64,
    total_marks: f64,
    percentage: u32,
    letter: LetterGrade,
}

#[derive(Debug, Serialize)]
struct AttendanceRow<'a> {
    student_id: &'a str,
    student_name: &'a str,
    date: String,
    start_time: String,
    end_time: String,
    status: String,
    reason: &'a str,
}

/// GET /api/v1/export/grades
pub async fn export_grades(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Query(params): Query<CourseParam>,
) -> ApiResult<Response> {
    current.require(&[Role::Faculty, Role::Admin])?;

    let roster = state.store.roster(&params.course).await?;
    let exams = state.store.exams(Some(&params.course)).await;
    let mut grades = Vec::new();
    for exam in &exams {
        grades.extend(state.store.grades_for_exam(exam.id).await);
    }

    let body = grades_csv(&roster, &exams, &grades)?;
    tracing::info!(course = %params.course, rows = grades.len(), "Exported grades");
    Ok(csv_response(body, &format!("{}_grades", params.course.to_lowercase())))
}

/// GET /api/v1/export/attendance
pub async fn export_attendance(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Query(params): Query<CourseParam>,
) -> ApiResult<Response> {
    current.require(&[Role::Faculty, Role::Admin])?;

    let roster = state.store.roster(&params.course).await?;
    let records = state.store.course_attendance(&params.course).await?;

    let body = attendance_csv(&roster, &records)?;
    tracing::info!(course = %params.course, rows = records.len(), "Exported attendance");
    Ok(csv_response(body, &format!("{}_attendance", params.course.to_lowercase())))
}

fn names(roster: &[User]) -> HashMap<&str, &str> {
    roster.iter().map(|u| (u.id.as_str(), u.name.as_str())).collect()
}

/// One row per grade, ordered by exam then student
fn grades_csv(roster: &[User], exams: &[Exam], grades: &[Grade]) -> ApiResult<Vec<u8>> {
    let names = names(roster);
    let mut writer = csv::Writer::from_writer(Vec::new());

    for exam in exams {
        let mut for_exam: Vec<&Grade> = grades.iter().filter(|g| g.exam_id == exam.id).collect();
        for_exam.sort_by(|a, b| a.student_id.cmp(&b.student_id));

        for grade in for_exam {
            let pct = percentage(grade.score, exam.total_marks);
            writer.serialize(GradeRow {
                student_id: &grade.student_id,
                student_name: names.get(grade.student_id.as_str()).copied().unwrap_or(""),
                exam: &exam.title,
                exam_date: exam.date.format("%Y-%m-%d").to_string(),
                score: grade.score,
                total_marks: exam.total_marks,
                percentage: pct,
                letter: LetterGrade::from_percentage(pct),
            })
            .map_err(csv_error)?;
        }
    }

    finish(writer)
}

fn attendance_csv(roster: &[User], records: &[AttendanceRecord]) -> ApiResult<Vec<u8>> {
    let names = names(roster);
    let mut writer = csv::Writer::from_writer(Vec::new());

    for record in records {
        writer
            .serialize(AttendanceRow {
                student_id: &record.student_id,
                student_name: names.get(record.student_id.as_str()).copied().unwrap_or(""),
                date: record.date.format("%Y-%m-%d").to_string(),
                start_time: record.start_time.format("%H:%M").to_string(),
                end_time: record.end_time.format("%H:%M").to_string(),
                status: record.status.to_string(),
                reason: record.reason.as_deref().unwrap_or(""),
            })
            .map_err(csv_error)?;
    }

    finish(writer)
}

fn finish(writer: csv::Writer<Vec<u8>>) -> ApiResult<Vec<u8>> {
    writer
        .into_inner()
        .map_err(|e| ApiError::Internal(format!("CSV flush failed: {}", e)))
}

fn csv_error(e: csv::Error) -> ApiError {
    ApiError::Internal(format!("CSV encoding failed: {}", e))
}

fn csv_response(body: Vec<u8>, stem: &str) -> Response {
    let filename = format!("{}_{}.csv", stem, Utc::now().format("%Y%m%d_%H%M%S"));

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        Body::from(body),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use crate::domain::AttendanceStatus;

    fn student(id: &str, name: &str) -> User {
        User::new(id, name, format!("{}@uni.edu", id), Role::Student)
    }

    #[test]
    fn test_grades_csv_shape() {
        let roster = vec![student("STU001", "Alex"), student("STU002", "Maria")];
        let exam = Exam {
            id: 7,
            course_code: "CS101".to_string(),
            title: "Quiz 1".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 9, 20).unwrap(),
            total_marks: 20.0,
        };
        let grades = vec![
            Grade { id: 2, student_id: "STU002".into(), exam_id: 7, score: 19.0, feedback: String::new() },
            Grade { id: 1, student_id: "STU001".into(), exam_id: 7, score: 13.0, feedback: String::new() },
        ];

        let csv = String::from_utf8(grades_csv(&roster, &[exam], &grades).unwrap()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines[0],
            "student_id,student_name,exam,exam_date,score,total_marks,percentage,letter"
        );
        assert_eq!(lines[1], "STU001,Alex,Quiz 1,2024-09-20,13.0,20.0,65,D");
        assert_eq!(lines[2], "STU002,Maria,Quiz 1,2024-09-20,19.0,20.0,95,A");
    }

    #[test]
    fn test_attendance_csv_quotes_reason() {
        let roster = vec![student("STU001", "Alex")];
        let record = AttendanceRecord {
            id: 1,
            student_id: "STU001".to_string(),
            course_code: "CS101".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 9, 2).unwrap(),
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(10, 30, 0).unwrap(),
            location: "Room 101".to_string(),
            status: AttendanceStatus::Absent,
            reason: Some("Sick, with note".to_string()),
        };

        let csv = String::from_utf8(attendance_csv(&roster, &[record]).unwrap()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "student_id,student_name,date,start_time,end_time,status,reason");
        assert_eq!(lines[1], "STU001,Alex,2024-09-02,09:00,10:30,absent,\"Sick, with note\"");
    }
}
