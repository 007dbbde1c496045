//! API Routes
//!
//! Route handlers organized by functionality.

pub mod announcements;
pub mod assistant;
pub mod attendance;
pub mod auth;
pub mod courses;
pub mod dashboard;
pub mod enrollments;
pub mod export;
pub mod faculty;
pub mod fees;
pub mod grades;
pub mod health;
pub mod preferences;
pub mod students;
