//! Portal analytics
//!
//! Pure computations over store records:
//!
//! - **attendance**: percentage, standing labels, per-course breakdowns
//! - **grades**: exam results, letter grades, course and exam statistics
//! - **fees**: billed / paid / pending summaries
//! - **listing**: the shared search / filter / paginate pipeline

pub mod attendance;
pub mod fees;
pub mod grades;
pub mod listing;

pub use attendance::{
    by_course, percentage, AttendanceBreakdown, AttendancePolicy, AttendanceSummary,
    CourseAttendance, Standing,
};
pub use fees::FeeSummary;
pub use grades::{CourseGradeSummary, ExamResult, ExamStatistics, LetterGrade};
pub use listing::{ListQuery, Page, Searchable};
