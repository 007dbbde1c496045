//! Campus domain
//!
//! - **types**: plain records (users, courses, attendance, exams, fees, ...)
//! - **store**: the in-memory `PortalStore` and its CRUD/enrollment operations
//! - **seed**: literal mock records a fresh store is loaded with
//! - **credentials**: salted password digests for mock accounts
//! - **error**: error types
//!
//! # Example
//!
//! ```rust,no_run
//! use campus::domain::PortalStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = PortalStore::seeded();
//!
//!     let view = store.enroll("STU001", "CS201").await?;
//!     println!("{} courses enrolled", view.enrolled.len());
//!
//!     Ok(())
//! }
//! ```

pub mod credentials;
pub mod error;
pub mod seed;
pub mod store;
pub mod types;

pub use credentials::Credentials;
pub use error::{PortalError, PortalResult};
pub use store::{is_plausible_email, EnrollmentView, NewAnnouncement, NewAttendance, NewExam, PortalStore};
pub use types::{
    Announcement, AnnouncementType, AttendanceRecord, AttendanceStatus, Audience, Course, Exam,
    FacultyMember, FeeCategory, FeeItem, FeeRecord, Grade, Role, StudentProfile, User,
};
