//! Portal Store
//!
//! In-memory home for every mock entity. All state lives behind a single
//! Tokio `RwLock`; readers get cloned snapshots so no lock is held across
//! handler awaits.
//!
//! Nothing here is durable: a restart rebuilds the store from
//! [`seed::mock_data`](crate::domain::seed::mock_data).

use chrono::{NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::credentials::Credentials;
use crate::domain::error::{PortalError, PortalResult};
use crate::domain::seed::{self, SeedData};
use crate::domain::types::*;

/// Maximum credits accepted for a course
pub const MAX_CREDITS: u8 = 10;

struct Account {
    user: User,
    credentials: Credentials,
}

#[derive(Default)]
struct PortalData {
    accounts: Vec<Account>,
    courses: Vec<Course>,
    /// Student id -> enrolled course codes, in enrollment order
    enrollments: HashMap<String, Vec<String>>,
    attendance: Vec<AttendanceRecord>,
    exams: Vec<Exam>,
    grades: Vec<Grade>,
    announcements: Vec<Announcement>,
    fees: Vec<FeeRecord>,
    faculty: Vec<FacultyMember>,
    next_id: u64,
}

impl PortalData {
    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn course(&self, code: &str) -> Option<&Course> {
        self.courses.iter().find(|c| c.has_code(code))
    }

    fn require_course(&self, code: &str) -> PortalResult<&Course> {
        self.course(code)
            .ok_or_else(|| PortalError::not_found("Course", code))
    }

    fn user(&self, id: &str) -> Option<&User> {
        self.accounts.iter().map(|a| &a.user).find(|u| u.id == id)
    }

    fn require_student(&self, id: &str) -> PortalResult<&User> {
        self.user(id)
            .filter(|u| u.is(Role::Student))
            .ok_or_else(|| PortalError::not_found("Student", id))
    }

    fn is_enrolled(&self, student_id: &str, code: &str) -> bool {
        self.enrollments
            .get(student_id)
            .map(|codes| codes.iter().any(|c| c.eq_ignore_ascii_case(code)))
            .unwrap_or(false)
    }

    fn next_user_id(&self, role: Role) -> String {
        let prefix = match role {
            Role::Student => "STU",
            Role::Faculty => "FAC",
            Role::Admin => "ADM",
        };
        let highest = self
            .accounts
            .iter()
            .filter_map(|a| a.user.id.strip_prefix(prefix))
            .filter_map(|n| n.parse::<u32>().ok())
            .max()
            .unwrap_or(0);
        format!("{}{:03}", prefix, highest + 1)
    }
}

/// A student's split of the catalogue
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnrollmentView {
    pub enrolled: Vec<Course>,
    pub available: Vec<Course>,
    pub total_credits: u32,
}

/// Input for marking one attendance session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAttendance {
    pub student_id: String,
    pub course_code: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    #[serde(default)]
    pub location: String,
    pub status: AttendanceStatus,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewExam {
    pub course_code: String,
    pub title: String,
    pub date: NaiveDate,
    pub total_marks: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAnnouncement {
    pub title: String,
    pub body: String,
    #[serde(rename = "type")]
    pub kind: AnnouncementType,
    /// Course code, or `None` for a global announcement
    #[serde(default)]
    pub course: Option<String>,
    #[serde(default)]
    pub important: bool,
}

/// The in-memory portal store
pub struct PortalStore {
    data: RwLock<PortalData>,
}

impl Default for PortalStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PortalStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            data: RwLock::new(PortalData::default()),
        }
    }

    /// Create a store loaded with the mock records
    pub fn seeded() -> Self {
        Self::from_seed(seed::mock_data())
    }

    pub fn from_seed(seed: SeedData) -> Self {
        let highest = seed
            .attendance
            .iter()
            .map(|r| r.id)
            .chain(seed.exams.iter().map(|e| e.id))
            .chain(seed.grades.iter().map(|g| g.id))
            .chain(seed.announcements.iter().map(|a| a.id))
            .chain(seed.fees.iter().map(|f| f.id))
            .max()
            .unwrap_or(0);

        let data = PortalData {
            accounts: seed
                .accounts
                .into_iter()
                .map(|(user, credentials)| Account { user, credentials })
                .collect(),
            courses: seed.courses,
            enrollments: seed.enrollments,
            attendance: seed.attendance,
            exams: seed.exams,
            grades: seed.grades,
            announcements: seed.announcements,
            fees: seed.fees,
            faculty: seed.faculty,
            next_id: highest,
        };

        Self {
            data: RwLock::new(data),
        }
    }

    // ============================================
    // Users
    // ============================================

    pub async fn user(&self, id: &str) -> Option<User> {
        self.data.read().await.user(id).cloned()
    }

    pub async fn count_by_role(&self, role: Role) -> usize {
        let data = self.data.read().await;
        data.accounts.iter().filter(|a| a.user.is(role)).count()
    }

    /// Check an email/password pair. Unknown email and wrong password fail alike.
    pub async fn authenticate(&self, email: &str, password: &str) -> PortalResult<User> {
        let data = self.data.read().await;
        data.accounts
            .iter()
            .find(|a| a.user.email.eq_ignore_ascii_case(email.trim()))
            .filter(|a| a.credentials.verify(password))
            .map(|a| a.user.clone())
            .ok_or(PortalError::InvalidCredentials)
    }

    /// Create an account; the id is assigned from the role prefix
    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        role: Role,
        password: &str,
    ) -> PortalResult<User> {
        let mut data = self.data.write().await;
        let email = email.trim();
        if data
            .accounts
            .iter()
            .any(|a| a.user.email.eq_ignore_ascii_case(email))
        {
            return Err(PortalError::already_exists("User", email));
        }

        let user = User::new(data.next_user_id(role), name.trim(), email.to_lowercase(), role);
        data.accounts.push(Account {
            user: user.clone(),
            credentials: Credentials::new(password),
        });

        tracing::info!(user_id = %user.id, role = %role, "Created user");
        Ok(user)
    }

    // ============================================
    // Courses
    // ============================================

    pub async fn courses(&self) -> Vec<Course> {
        self.data.read().await.courses.clone()
    }

    pub async fn course(&self, code: &str) -> Option<Course> {
        self.data.read().await.course(code).cloned()
    }

    /// Courses whose instructor is `name`
    pub async fn courses_taught_by(&self, name: &str) -> Vec<Course> {
        let data = self.data.read().await;
        data.courses
            .iter()
            .filter(|c| c.instructor == name)
            .cloned()
            .collect()
    }

    pub async fn create_course(&self, mut course: Course) -> PortalResult<Course> {
        course.code = course.code.trim().to_uppercase();
        validate_course(&course)?;

        let mut data = self.data.write().await;
        if data.course(&course.code).is_some() {
            return Err(PortalError::already_exists("Course", course.code));
        }
        data.courses.push(course.clone());

        tracing::info!(course_code = %course.code, "Created course");
        Ok(course)
    }

    /// Remove exactly the matching course along with everything that
    /// refers to it: enrollments, attendance, exams and their grades,
    /// course announcements and faculty assignments.
    pub async fn delete_course(&self, code: &str) -> PortalResult<Course> {
        let mut data = self.data.write().await;
        let index = data
            .courses
            .iter()
            .position(|c| c.has_code(code))
            .ok_or_else(|| PortalError::not_found("Course", code))?;
        let removed = data.courses.remove(index);

        for codes in data.enrollments.values_mut() {
            codes.retain(|c| !removed.has_code(c));
        }
        data.attendance.retain(|r| !removed.has_code(&r.course_code));

        let exam_ids: Vec<u64> = data
            .exams
            .iter()
            .filter(|e| removed.has_code(&e.course_code))
            .map(|e| e.id)
            .collect();
        data.exams.retain(|e| !exam_ids.contains(&e.id));
        data.grades.retain(|g| !exam_ids.contains(&g.exam_id));

        data.announcements.retain(|a| match &a.audience {
            Audience::Course(c) => !removed.has_code(c),
            Audience::Global => true,
        });
        for member in data.faculty.iter_mut() {
            member.courses.retain(|c| !removed.has_code(c));
        }

        tracing::info!(
            course_code = %removed.code,
            exams = exam_ids.len(),
            "Deleted course"
        );
        Ok(removed)
    }

    // ============================================
    // Enrollment
    // ============================================

    pub async fn enrolled_codes(&self, student_id: &str) -> Vec<String> {
        let data = self.data.read().await;
        data.enrollments.get(student_id).cloned().unwrap_or_default()
    }

    pub async fn enrollment_view(&self, student_id: &str) -> PortalResult<EnrollmentView> {
        let data = self.data.read().await;
        data.require_student(student_id)?;
        Ok(build_enrollment_view(&data, student_id))
    }

    /// Move `code` from the student's available list to their enrolled list
    pub async fn enroll(&self, student_id: &str, code: &str) -> PortalResult<EnrollmentView> {
        let mut data = self.data.write().await;
        data.require_student(student_id)?;
        let canonical = data.require_course(code)?.code.clone();

        if data.is_enrolled(student_id, &canonical) {
            return Err(PortalError::AlreadyEnrolled(canonical));
        }
        data.enrollments
            .entry(student_id.to_string())
            .or_default()
            .push(canonical.clone());

        tracing::info!(student_id, course_code = %canonical, "Enrolled");
        Ok(build_enrollment_view(&data, student_id))
    }

    /// Move `code` back from enrolled to available
    pub async fn drop_course(&self, student_id: &str, code: &str) -> PortalResult<EnrollmentView> {
        let mut data = self.data.write().await;
        data.require_student(student_id)?;

        let canonical = data
            .enrollments
            .get(student_id)
            .and_then(|codes| codes.iter().find(|c| c.eq_ignore_ascii_case(code)))
            .cloned()
            .ok_or_else(|| PortalError::NotEnrolled(code.to_uppercase()))?;
        if let Some(codes) = data.enrollments.get_mut(student_id) {
            codes.retain(|c| *c != canonical);
        }

        tracing::info!(student_id, course_code = %canonical, "Dropped course");
        Ok(build_enrollment_view(&data, student_id))
    }

    /// Students enrolled in `code`
    pub async fn roster(&self, code: &str) -> PortalResult<Vec<User>> {
        let data = self.data.read().await;
        data.require_course(code)?;

        let mut students: Vec<User> = data
            .accounts
            .iter()
            .map(|a| &a.user)
            .filter(|u| u.is(Role::Student) && data.is_enrolled(&u.id, code))
            .cloned()
            .collect();
        students.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(students)
    }

    // ============================================
    // Attendance
    // ============================================

    /// A student's records, optionally for one course, in date order
    pub async fn attendance_for(
        &self,
        student_id: &str,
        course: Option<&str>,
    ) -> Vec<AttendanceRecord> {
        let data = self.data.read().await;
        let mut records: Vec<AttendanceRecord> = data
            .attendance
            .iter()
            .filter(|r| r.student_id == student_id)
            .filter(|r| course.map(|c| r.course_code.eq_ignore_ascii_case(c)).unwrap_or(true))
            .cloned()
            .collect();
        records.sort_by(|a, b| a.date.cmp(&b.date).then(a.start_time.cmp(&b.start_time)));
        records
    }

    /// Every record for one course
    pub async fn course_attendance(&self, code: &str) -> PortalResult<Vec<AttendanceRecord>> {
        let data = self.data.read().await;
        data.require_course(code)?;
        let mut records: Vec<AttendanceRecord> = data
            .attendance
            .iter()
            .filter(|r| r.course_code.eq_ignore_ascii_case(code))
            .cloned()
            .collect();
        records.sort_by(|a, b| a.date.cmp(&b.date).then(a.student_id.cmp(&b.student_id)));
        Ok(records)
    }

    /// Record a session; re-marking the same student/course/date/start overwrites it
    pub async fn mark_attendance(&self, input: NewAttendance) -> PortalResult<AttendanceRecord> {
        if input.end_time <= input.start_time {
            return Err(PortalError::Validation(
                "end_time must be after start_time".to_string(),
            ));
        }

        let mut data = self.data.write().await;
        data.require_student(&input.student_id)?;
        let code = data.require_course(&input.course_code)?.code.clone();
        if !data.is_enrolled(&input.student_id, &code) {
            return Err(PortalError::NotEnrolled(code));
        }

        let reason = input
            .reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty() && input.status == AttendanceStatus::Absent);

        if let Some(existing) = data.attendance.iter_mut().find(|r| {
            r.student_id == input.student_id
                && r.course_code == code
                && r.date == input.date
                && r.start_time == input.start_time
        }) {
            existing.status = input.status;
            existing.reason = reason;
            existing.end_time = input.end_time;
            if !input.location.is_empty() {
                existing.location = input.location;
            }
            return Ok(existing.clone());
        }

        let record = AttendanceRecord {
            id: data.allocate_id(),
            student_id: input.student_id,
            course_code: code,
            date: input.date,
            start_time: input.start_time,
            end_time: input.end_time,
            location: input.location,
            status: input.status,
            reason,
        };
        data.attendance.push(record.clone());

        tracing::debug!(record_id = record.id, status = %record.status, "Marked attendance");
        Ok(record)
    }

    // ============================================
    // Exams & grades
    // ============================================

    pub async fn exams(&self, course: Option<&str>) -> Vec<Exam> {
        let data = self.data.read().await;
        let mut exams: Vec<Exam> = data
            .exams
            .iter()
            .filter(|e| course.map(|c| e.course_code.eq_ignore_ascii_case(c)).unwrap_or(true))
            .cloned()
            .collect();
        exams.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));
        exams
    }

    pub async fn exam(&self, id: u64) -> Option<Exam> {
        self.data.read().await.exams.iter().find(|e| e.id == id).cloned()
    }

    pub async fn create_exam(&self, input: NewExam) -> PortalResult<Exam> {
        if input.title.trim().is_empty() {
            return Err(PortalError::Validation("Exam title cannot be empty".to_string()));
        }
        if !(input.total_marks.is_finite() && input.total_marks > 0.0) {
            return Err(PortalError::Validation(
                "total_marks must be greater than zero".to_string(),
            ));
        }

        let mut data = self.data.write().await;
        let code = data.require_course(&input.course_code)?.code.clone();
        let exam = Exam {
            id: data.allocate_id(),
            course_code: code,
            title: input.title.trim().to_string(),
            date: input.date,
            total_marks: input.total_marks,
        };
        data.exams.push(exam.clone());

        tracing::info!(exam_id = exam.id, course_code = %exam.course_code, "Created exam");
        Ok(exam)
    }

    pub async fn grades_for_student(&self, student_id: &str) -> Vec<Grade> {
        let data = self.data.read().await;
        data.grades
            .iter()
            .filter(|g| g.student_id == student_id)
            .cloned()
            .collect()
    }

    pub async fn grades_for_exam(&self, exam_id: u64) -> Vec<Grade> {
        let data = self.data.read().await;
        data.grades
            .iter()
            .filter(|g| g.exam_id == exam_id)
            .cloned()
            .collect()
    }

    /// Insert or overwrite a student's grade for an exam
    pub async fn record_grade(
        &self,
        student_id: &str,
        exam_id: u64,
        score: f64,
        feedback: &str,
    ) -> PortalResult<Grade> {
        let mut data = self.data.write().await;
        data.require_student(student_id)?;
        let exam = data
            .exams
            .iter()
            .find(|e| e.id == exam_id)
            .cloned()
            .ok_or_else(|| PortalError::not_found("Exam", exam_id.to_string()))?;

        if !(score.is_finite() && (0.0..=exam.total_marks).contains(&score)) {
            return Err(PortalError::Validation(format!(
                "score must be between 0 and {}",
                exam.total_marks
            )));
        }
        if !data.is_enrolled(student_id, &exam.course_code) {
            return Err(PortalError::NotEnrolled(exam.course_code));
        }

        if let Some(existing) = data
            .grades
            .iter_mut()
            .find(|g| g.student_id == student_id && g.exam_id == exam_id)
        {
            existing.score = score;
            existing.feedback = feedback.to_string();
            return Ok(existing.clone());
        }

        let grade = Grade {
            id: data.allocate_id(),
            student_id: student_id.to_string(),
            exam_id,
            score,
            feedback: feedback.to_string(),
        };
        data.grades.push(grade.clone());
        Ok(grade)
    }

    // ============================================
    // Announcements
    // ============================================

    /// Announcements `user` may read: students get global ones plus those of
    /// their enrolled courses; faculty and admins get everything.
    pub async fn announcements_for(&self, user: &User) -> Vec<Announcement> {
        let data = self.data.read().await;
        data.announcements
            .iter()
            .filter(|a| match (&a.audience, user.role) {
                (Audience::Global, _) => true,
                (Audience::Course(code), Role::Student) => data.is_enrolled(&user.id, code),
                (Audience::Course(_), _) => true,
            })
            .cloned()
            .collect()
    }

    pub async fn create_announcement(
        &self,
        input: NewAnnouncement,
        author: &User,
    ) -> PortalResult<Announcement> {
        if input.title.trim().is_empty() {
            return Err(PortalError::Validation("title cannot be empty".to_string()));
        }
        if input.body.trim().is_empty() {
            return Err(PortalError::Validation("body cannot be empty".to_string()));
        }

        let mut data = self.data.write().await;
        let audience = match input.course.as_deref().map(str::trim) {
            None | Some("") => Audience::Global,
            Some(code) => Audience::Course(data.require_course(code)?.code.clone()),
        };

        let announcement = Announcement {
            id: data.allocate_id(),
            title: input.title.trim().to_string(),
            body: input.body.trim().to_string(),
            author: author.name.clone(),
            kind: input.kind,
            audience,
            important: input.important,
            posted_at: Utc::now(),
        };
        data.announcements.push(announcement.clone());

        tracing::info!(announcement_id = announcement.id, author = %author.id, "Posted announcement");
        Ok(announcement)
    }

    pub async fn delete_announcement(&self, id: u64) -> PortalResult<Announcement> {
        let mut data = self.data.write().await;
        let index = data
            .announcements
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| PortalError::not_found("Announcement", id.to_string()))?;
        Ok(data.announcements.remove(index))
    }

    pub async fn announcement_count(&self) -> usize {
        self.data.read().await.announcements.len()
    }

    // ============================================
    // Fees
    // ============================================

    pub async fn fees_for(&self, student_id: &str) -> Vec<FeeRecord> {
        let data = self.data.read().await;
        let mut records: Vec<FeeRecord> = data
            .fees
            .iter()
            .filter(|f| f.student_id == student_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| a.due_date.cmp(&b.due_date));
        records
    }

    pub async fn all_fees(&self) -> Vec<FeeRecord> {
        self.data.read().await.fees.clone()
    }

    /// Apply a payment to one of the student's records. No gateway is
    /// involved; the amount is simply credited.
    pub async fn record_payment(
        &self,
        student_id: &str,
        fee_id: u64,
        amount: f64,
    ) -> PortalResult<FeeRecord> {
        if !(amount.is_finite() && amount > 0.0) {
            return Err(PortalError::Validation(
                "amount must be greater than zero".to_string(),
            ));
        }

        let mut data = self.data.write().await;
        let record = data
            .fees
            .iter_mut()
            .find(|f| f.id == fee_id && f.student_id == student_id)
            .ok_or_else(|| PortalError::not_found("Fee record", fee_id.to_string()))?;

        let pending = record.pending();
        if amount > pending + f64::EPSILON {
            return Err(PortalError::Validation(format!(
                "amount {:.2} exceeds pending balance {:.2}",
                amount, pending
            )));
        }
        record.paid += amount;

        tracing::info!(student_id, fee_id, amount, "Recorded fee payment");
        Ok(record.clone())
    }

    // ============================================
    // Faculty directory
    // ============================================

    pub async fn faculty(&self) -> Vec<FacultyMember> {
        self.data.read().await.faculty.clone()
    }

    pub async fn create_faculty(&self, mut member: FacultyMember) -> PortalResult<FacultyMember> {
        member.name = member.name.trim().to_string();
        member.email = member.email.trim().to_lowercase();
        if member.name.is_empty() {
            return Err(PortalError::Validation("name cannot be empty".to_string()));
        }
        if !is_plausible_email(&member.email) {
            return Err(PortalError::Validation(format!(
                "Invalid email address: {}",
                member.email
            )));
        }

        let mut data = self.data.write().await;
        if data
            .faculty
            .iter()
            .any(|f| f.email.eq_ignore_ascii_case(&member.email))
        {
            return Err(PortalError::already_exists("Faculty member", member.email));
        }
        if member.id.trim().is_empty() {
            let highest = data
                .faculty
                .iter()
                .filter_map(|f| f.id.strip_prefix("FAC"))
                .filter_map(|n| n.parse::<u32>().ok())
                .max()
                .unwrap_or(0);
            member.id = format!("FAC{:03}", highest + 1);
        } else if data.faculty.iter().any(|f| f.id == member.id) {
            return Err(PortalError::already_exists("Faculty member", member.id));
        }
        data.faculty.push(member.clone());

        tracing::info!(faculty_id = %member.id, "Added faculty member");
        Ok(member)
    }

    pub async fn delete_faculty(&self, id: &str) -> PortalResult<FacultyMember> {
        let mut data = self.data.write().await;
        let index = data
            .faculty
            .iter()
            .position(|f| f.id == id)
            .ok_or_else(|| PortalError::not_found("Faculty member", id))?;
        Ok(data.faculty.remove(index))
    }
}

fn build_enrollment_view(data: &PortalData, student_id: &str) -> EnrollmentView {
    let codes = data.enrollments.get(student_id);
    let enrolled: Vec<Course> = codes
        .into_iter()
        .flatten()
        .filter_map(|code| data.course(code).cloned())
        .collect();
    let available = data
        .courses
        .iter()
        .filter(|c| !enrolled.iter().any(|e| e.has_code(&c.code)))
        .cloned()
        .collect();
    let total_credits = enrolled.iter().map(|c| c.credits as u32).sum();

    EnrollmentView {
        enrolled,
        available,
        total_credits,
    }
}

fn validate_course(course: &Course) -> PortalResult<()> {
    if course.code.is_empty() {
        return Err(PortalError::Validation("Course code cannot be empty".to_string()));
    }
    if course.code.len() > 16 || !course.code.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(PortalError::Validation(
            "Course code must be at most 16 letters, digits or dashes".to_string(),
        ));
    }
    if course.title.trim().is_empty() {
        return Err(PortalError::Validation("Course title cannot be empty".to_string()));
    }
    if course.credits == 0 || course.credits > MAX_CREDITS {
        return Err(PortalError::Validation(format!(
            "credits must be between 1 and {}",
            MAX_CREDITS
        )));
    }
    Ok(())
}

/// Minimal shape check: one `@` with text on both sides and a dot in the domain
pub fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_enroll_moves_course_exactly_once() {
        let store = PortalStore::seeded();
        let before = store.enrollment_view("STU001").await.unwrap();
        assert!(before.available.iter().any(|c| c.code == "CS201"));

        let after = store.enroll("STU001", "cs201").await.unwrap();
        assert!(!after.available.iter().any(|c| c.code == "CS201"));
        assert_eq!(after.enrolled.iter().filter(|c| c.code == "CS201").count(), 1);
        assert_eq!(after.enrolled.len(), before.enrolled.len() + 1);

        let again = store.enroll("STU001", "CS201").await;
        assert_eq!(again, Err(PortalError::AlreadyEnrolled("CS201".to_string())));

        let view = store.enrollment_view("STU001").await.unwrap();
        assert_eq!(view.enrolled.iter().filter(|c| c.code == "CS201").count(), 1);
        assert_eq!(view.enrolled.len() + view.available.len(), store.courses().await.len());
    }

    #[tokio::test]
    async fn test_drop_course() {
        let store = PortalStore::seeded();
        let view = store.drop_course("STU001", "MA201").await.unwrap();
        assert!(view.available.iter().any(|c| c.code == "MA201"));

        let err = store.drop_course("STU001", "MA201").await.unwrap_err();
        assert!(matches!(err, PortalError::NotEnrolled(_)));

        let view = store.drop_course("STU001", "ph101").await.unwrap();
        assert_eq!(store.enrolled_codes("STU001").await, vec!["CS101".to_string()]);
        assert!(view.available.iter().any(|c| c.code == "PH101"));
        let err = store.drop_course("STU001", "ph101").await.unwrap_err();
        assert!(matches!(err, PortalError::NotEnrolled(ref c) if c == "PH101"));
    }

    #[tokio::test]
    async fn test_enroll_unknown_course_or_non_student() {
        let store = PortalStore::seeded();
        assert!(matches!(
            store.enroll("STU001", "XX999").await,
            Err(PortalError::NotFound { .. })
        ));
        assert!(matches!(
            store.enroll("FAC001", "CS101").await,
            Err(PortalError::NotFound { entity: "Student", .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_course_removes_only_match() {
        let store = PortalStore::seeded();
        let before = store.courses().await;

        let removed = store.delete_course("ma201").await.unwrap();
        assert_eq!(removed.code, "MA201");

        let after = store.courses().await;
        assert_eq!(after.len(), before.len() - 1);
        let expected: Vec<_> = before.into_iter().filter(|c| c.code != "MA201").collect();
        assert_eq!(after, expected);

        assert!(!store.enrolled_codes("STU001").await.contains(&"MA201".to_string()));
        assert!(store.delete_course("MA201").await.is_err());
    }

    #[tokio::test]
    async fn test_delete_course_removes_dependent_records() {
        let store = PortalStore::seeded();
        let alex = store.user("STU001").await.unwrap();
        let ma201_exams: Vec<u64> = store.exams(Some("MA201")).await.iter().map(|e| e.id).collect();
        assert!(!ma201_exams.is_empty());
        assert!(!store.attendance_for("STU001", Some("MA201")).await.is_empty());
        let cs101_rows = store.attendance_for("STU001", Some("CS101")).await.len();

        store.delete_course("MA201").await.unwrap();

        assert!(store.attendance_for("STU001", Some("MA201")).await.is_empty());
        assert_eq!(store.attendance_for("STU001", Some("CS101")).await.len(), cs101_rows);
        assert!(store.exams(Some("MA201")).await.is_empty());
        assert!(store
            .grades_for_student("STU001")
            .await
            .iter()
            .all(|g| !ma201_exams.contains(&g.exam_id)));
        assert!(store
            .announcements_for(&alex)
            .await
            .iter()
            .all(|a| a.audience != Audience::Course("MA201".to_string())));
        assert!(store
            .faculty()
            .await
            .iter()
            .all(|f| !f.courses.iter().any(|c| c.eq_ignore_ascii_case("MA201"))));
    }

    #[tokio::test]
    async fn test_create_course_validation() {
        let store = PortalStore::seeded();
        let err = store.create_course(Course::new("cs101", "Dup", 3)).await.unwrap_err();
        assert!(matches!(err, PortalError::AlreadyExists { .. }));

        let err = store.create_course(Course::new("CS999", "Zero", 0)).await.unwrap_err();
        assert!(matches!(err, PortalError::Validation(_)));

        let created = store
            .create_course(Course::new(" cs401 ", "Compilers", 4).department("Computer Science"))
            .await
            .unwrap();
        assert_eq!(created.code, "CS401");
    }

    #[tokio::test]
    async fn test_authenticate() {
        let store = PortalStore::seeded();
        let user = store
            .authenticate("Alex.Johnson@university.edu", "student123")
            .await
            .unwrap();
        assert_eq!(user.id, "STU001");

        assert_eq!(
            store.authenticate("alex.johnson@university.edu", "nope").await,
            Err(PortalError::InvalidCredentials)
        );
        assert_eq!(
            store.authenticate("ghost@university.edu", "student123").await,
            Err(PortalError::InvalidCredentials)
        );
    }

    #[tokio::test]
    async fn test_create_user_assigns_next_id() {
        let store = PortalStore::seeded();
        let user = store
            .create_user("New Student", "new@university.edu", Role::Student, "secret1")
            .await
            .unwrap();
        assert_eq!(user.id, "STU004");

        let dup = store
            .create_user("Other", "NEW@university.edu", Role::Student, "secret1")
            .await;
        assert!(matches!(dup, Err(PortalError::AlreadyExists { .. })));
    }

    #[tokio::test]
    async fn test_mark_attendance_overwrites_same_session() {
        let store = PortalStore::seeded();
        let date = NaiveDate::from_ymd_opt(2024, 12, 2).unwrap();
        let input = NewAttendance {
            student_id: "STU001".to_string(),
            course_code: "CS101".to_string(),
            date,
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(10, 30, 0).unwrap(),
            location: "Lab 2".to_string(),
            status: AttendanceStatus::Absent,
            reason: Some("Sick".to_string()),
        };

        let before = store.attendance_for("STU001", Some("CS101")).await.len();
        let first = store.mark_attendance(input.clone()).await.unwrap();
        let second = store
            .mark_attendance(NewAttendance {
                status: AttendanceStatus::Present,
                ..input
            })
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.reason, None);
        assert_eq!(store.attendance_for("STU001", Some("CS101")).await.len(), before + 1);
    }

    #[tokio::test]
    async fn test_mark_attendance_requires_enrollment() {
        let store = PortalStore::seeded();
        let input = NewAttendance {
            student_id: "STU002".to_string(),
            course_code: "PH101".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 12, 2).unwrap(),
            start_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
            location: String::new(),
            status: AttendanceStatus::Present,
            reason: None,
        };
        assert!(matches!(
            store.mark_attendance(input).await,
            Err(PortalError::NotEnrolled(_))
        ));
    }

    #[tokio::test]
    async fn test_record_grade_bounds() {
        let store = PortalStore::seeded();
        let exam = store
            .create_exam(NewExam {
                course_code: "CS101".to_string(),
                title: "Final".to_string(),
                date: NaiveDate::from_ymd_opt(2024, 12, 10).unwrap(),
                total_marks: 100.0,
            })
            .await
            .unwrap();

        assert!(store.record_grade("STU001", exam.id, 101.0, "").await.is_err());
        assert!(store.record_grade("STU001", exam.id, -1.0, "").await.is_err());

        let grade = store.record_grade("STU001", exam.id, 88.0, "Well done").await.unwrap();
        let again = store.record_grade("STU001", exam.id, 91.0, "Regraded").await.unwrap();
        assert_eq!(grade.id, again.id);
        assert_eq!(store.grades_for_exam(exam.id).await.len(), 1);
    }

    #[tokio::test]
    async fn test_announcement_visibility() {
        let store = PortalStore::seeded();
        let student = store.user("STU002").await.unwrap();
        let visible = store.announcements_for(&student).await;

        assert!(visible.iter().any(|a| a.audience == Audience::Course("CS101".to_string())));
        assert!(!visible.iter().any(|a| a.audience == Audience::Course("MA201".to_string())));

        let admin = store.user("ADM001").await.unwrap();
        assert_eq!(store.announcements_for(&admin).await.len(), store.announcement_count().await);
    }

    #[tokio::test]
    async fn test_delete_announcement_removes_only_match() {
        let store = PortalStore::seeded();
        let admin = store.user("ADM001").await.unwrap();
        let before = store.announcements_for(&admin).await;
        let target = before[1].id;

        store.delete_announcement(target).await.unwrap();
        let after = store.announcements_for(&admin).await;
        let expected: Vec<_> = before.into_iter().filter(|a| a.id != target).collect();
        assert_eq!(after, expected);
    }

    #[tokio::test]
    async fn test_record_payment() {
        let store = PortalStore::seeded();
        let fall = store
            .fees_for("STU001")
            .await
            .into_iter()
            .find(|f| !f.is_settled())
            .unwrap();
        let pending = fall.pending();

        assert!(store.record_payment("STU001", fall.id, pending + 1.0).await.is_err());
        assert!(store.record_payment("STU002", fall.id, 10.0).await.is_err());

        let updated = store.record_payment("STU001", fall.id, pending).await.unwrap();
        assert!(updated.is_settled());
    }

    #[tokio::test]
    async fn test_faculty_crud() {
        let store = PortalStore::seeded();
        let member = FacultyMember {
            id: String::new(),
            name: "Dr. Ana Lima".to_string(),
            email: "ana.lima@university.edu".to_string(),
            department: "Physics".to_string(),
            designation: "Lecturer".to_string(),
            courses: Vec::new(),
        };
        let created = store.create_faculty(member.clone()).await.unwrap();
        assert_eq!(created.id, "FAC005");
        assert!(store.create_faculty(member).await.is_err());

        let before = store.faculty().await.len();
        store.delete_faculty("FAC002").await.unwrap();
        let after = store.faculty().await;
        assert_eq!(after.len(), before - 1);
        assert!(after.iter().all(|f| f.id != "FAC002"));
    }

    #[test]
    fn test_email_shape() {
        assert!(is_plausible_email("a@b.edu"));
        assert!(!is_plausible_email("a@b"));
        assert!(!is_plausible_email("@b.edu"));
        assert!(!is_plausible_email("a b@c.edu"));
        assert!(!is_plausible_email("a@@b.edu"));
    }
}
