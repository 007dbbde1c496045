//! Core record types for the campus portal
//!
//! This module defines the plain records held by the portal store:
//! - `User` and `Role`: who is signed in and what they may see
//! - `Course`: catalogue entries students enroll in
//! - `AttendanceRecord`: one class session for one student
//! - `Exam` and `Grade`: assessments and their scores
//! - `Announcement`: notices, either global or scoped to a course
//! - `FeeRecord`: billed items and what has been paid
//! - `FacultyMember` and `StudentProfile`: directory entries

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::error::PortalError;

/// The three fixed portal roles
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Faculty,
    Admin,
}

impl Role {
    pub fn all() -> &'static [Role] {
        &[Role::Student, Role::Faculty, Role::Admin]
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Student => write!(f, "student"),
            Role::Faculty => write!(f, "faculty"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

impl FromStr for Role {
    type Err = PortalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "student" => Ok(Role::Student),
            "faculty" => Ok(Role::Faculty),
            "admin" => Ok(Role::Admin),
            other => Err(PortalError::Validation(format!(
                "Invalid role: {}. Use student, faculty, or admin",
                other
            ))),
        }
    }
}

/// A portal account
///
/// Credentials are kept beside the user inside the store and are never
/// part of this record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
}

impl User {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            role,
            avatar: None,
            department: None,
        }
    }

    /// Builder: set avatar reference
    pub fn avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = Some(avatar.into());
        self
    }

    /// Builder: set department
    pub fn department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    pub fn is(&self, role: Role) -> bool {
        self.role == role
    }
}

/// A catalogue course
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Course {
    /// Unique course code (e.g. "CS101"), compared case-insensitively
    pub code: String,
    pub title: String,
    pub credits: u8,
    pub department: String,
    pub instructor: String,
    /// Free-form meeting times, e.g. "Mon, Wed 09:00-10:30"
    pub schedule: String,
    #[serde(default)]
    pub description: String,
}

impl Course {
    pub fn new(code: impl Into<String>, title: impl Into<String>, credits: u8) -> Self {
        Self {
            code: code.into(),
            title: title.into(),
            credits,
            department: String::new(),
            instructor: String::new(),
            schedule: String::new(),
            description: String::new(),
        }
    }

    pub fn department(mut self, department: impl Into<String>) -> Self {
        self.department = department.into();
        self
    }

    pub fn instructor(mut self, instructor: impl Into<String>) -> Self {
        self.instructor = instructor.into();
        self
    }

    pub fn schedule(mut self, schedule: impl Into<String>) -> Self {
        self.schedule = schedule.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Case-insensitive code comparison
    pub fn has_code(&self, code: &str) -> bool {
        self.code.eq_ignore_ascii_case(code)
    }
}

/// Whether a student attended a session
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl std::fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttendanceStatus::Present => write!(f, "present"),
            AttendanceStatus::Absent => write!(f, "absent"),
        }
    }
}

/// One class session for one student
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AttendanceRecord {
    pub id: u64,
    pub student_id: String,
    pub course_code: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub location: String,
    pub status: AttendanceStatus,
    #[serde(default)]
    pub reason: Option<String>,
}

impl AttendanceRecord {
    pub fn is_present(&self) -> bool {
        self.status == AttendanceStatus::Present
    }
}

/// An assessment within a course
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Exam {
    pub id: u64,
    pub course_code: String,
    pub title: String,
    pub date: NaiveDate,
    pub total_marks: f64,
}

/// A student's score on an exam
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Grade {
    pub id: u64,
    pub student_id: String,
    pub exam_id: u64,
    pub score: f64,
    #[serde(default)]
    pub feedback: String,
}

/// Announcement category, used as the listing tab
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AnnouncementType {
    General,
    Academic,
    Exam,
    Event,
    Administrative,
}

impl AnnouncementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnnouncementType::General => "general",
            AnnouncementType::Academic => "academic",
            AnnouncementType::Exam => "exam",
            AnnouncementType::Event => "event",
            AnnouncementType::Administrative => "administrative",
        }
    }
}

impl std::fmt::Display for AnnouncementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnnouncementType {
    type Err = PortalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "general" => Ok(AnnouncementType::General),
            "academic" => Ok(AnnouncementType::Academic),
            "exam" => Ok(AnnouncementType::Exam),
            "event" => Ok(AnnouncementType::Event),
            "administrative" | "admin" => Ok(AnnouncementType::Administrative),
            other => Err(PortalError::Validation(format!(
                "Invalid announcement type: {}. Use general, academic, exam, event, or administrative",
                other
            ))),
        }
    }
}

/// Who an announcement is addressed to
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "scope", content = "course", rename_all = "lowercase")]
pub enum Audience {
    Global,
    Course(String),
}

/// A posted notice
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Announcement {
    pub id: u64,
    pub title: String,
    pub body: String,
    pub author: String,
    #[serde(rename = "type")]
    pub kind: AnnouncementType,
    pub audience: Audience,
    #[serde(default)]
    pub important: bool,
    pub posted_at: DateTime<Utc>,
}

/// Fee line-item category
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum FeeCategory {
    Tuition,
    Library,
    Laboratory,
    Hostel,
    Examination,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeeItem {
    pub category: FeeCategory,
    pub amount: f64,
}

/// A term's bill for one student
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeeRecord {
    pub id: u64,
    pub student_id: String,
    pub term: String,
    pub due_date: NaiveDate,
    pub items: Vec<FeeItem>,
    #[serde(default)]
    pub paid: f64,
}

impl FeeRecord {
    /// Sum of all line items
    pub fn amount(&self) -> f64 {
        self.items.iter().map(|i| i.amount).sum()
    }

    /// Outstanding balance, never negative
    pub fn pending(&self) -> f64 {
        (self.amount() - self.paid).max(0.0)
    }

    pub fn is_settled(&self) -> bool {
        self.pending() <= f64::EPSILON
    }
}

/// A faculty directory entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FacultyMember {
    pub id: String,
    pub name: String,
    pub email: String,
    pub department: String,
    pub designation: String,
    #[serde(default)]
    pub courses: Vec<String>,
}

/// A row of the hosted `student_profiles` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StudentProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub program: String,
    #[serde(default)]
    pub year: u8,
    #[serde(default)]
    pub phone: Option<String>,
}
