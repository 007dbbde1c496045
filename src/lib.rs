//! # Campus
//!
//! Role-based university administration portal: a JSON API for students,
//! faculty and administrators covering the course catalogue, enrollment,
//! attendance, exams and grades, fees, announcements and a study assistant.
//!
//! ## Modules
//!
//! - [`domain`]: records and the in-memory `PortalStore` seeded with mock data
//! - [`analytics`]: attendance and grade aggregation, fee summaries, list views
//! - [`session`]: sign-in, sign-up, bearer tokens and theme preferences
//! - [`profiles`]: student profiles from a hosted table, or a local fallback
//! - [`assistant`]: rule-based study assistant
//! - [`api`]: REST API server with Axum
//! - [`config`]: TOML configuration with `CAMPUS_*` overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use campus::analytics::{by_course, AttendancePolicy};
//! use campus::domain::PortalStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = PortalStore::seeded();
//!
//!     // Enroll a student and check their attendance standing
//!     store.enroll("STU002", "PH101").await?;
//!     let records = store.attendance_for("STU002", None).await;
//!     let breakdown = by_course(&records, &AttendancePolicy::default());
//!
//!     for course in breakdown.at_risk() {
//!         println!("{} is at {}%", course.course_code, course.summary.percentage);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod analytics;
pub mod api;
pub mod assistant;
pub mod config;
pub mod domain;
pub mod profiles;
pub mod session;

// Re-export top-level types for convenience
pub use domain::{
    Announcement, AttendanceRecord, Course, EnrollmentView, Exam, FacultyMember, FeeRecord, Grade,
    PortalError, PortalResult, PortalStore, Role, StudentProfile, User,
};

pub use analytics::{AttendancePolicy, AttendanceSummary, ListQuery, Page, Standing};

pub use session::{Session, SessionError, SessionManager, Theme};

pub use profiles::{HostedProfileClient, LocalProfiles, ProfileError, ProfileSource};

pub use assistant::{AssistantReply, StudyAssistant};

pub use api::{build_router, serve, ApiConfig, ApiError, AppState};

pub use config::{Config, ConfigError, LoggingConfig};
